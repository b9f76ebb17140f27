//! Sample rows from the first finished attempt that produced a result set.

use tracing::{error, warn};

use crate::gateway::StatementGateway;
use crate::model::{Attempt, AttemptStatus, RowSet};

/// Rows shown per sample.
pub const SHOW_RECS: usize = 3;

/// Fetch up to `limit` rows from the last statement of the first finished
/// attempt with a result set. Only that one attempt is examined for rows, even
/// when the fetch fails.
pub async fn sample_records<'a>(
    gateway: &dyn StatementGateway,
    attempts: impl IntoIterator<Item = &'a Attempt>,
    limit: usize,
) -> Option<RowSet> {
    let attempt = attempts
        .into_iter()
        .filter(|a| a.status == AttemptStatus::Finished)
        .find(|a| a.has_result_set)?;

    let Some(last) = attempt.last_sub_statement() else {
        warn!(
            attempt = attempt.ordinal,
            "result set reported without sub-statements"
        );
        return None;
    };

    match gateway.fetch_rows(&last.id).await {
        Ok(rows) => Some(rows.head(limit)),
        Err(e) => {
            error!(attempt = attempt.ordinal, id = %last.id, "{}", e);
            None
        }
    }
}
