//! Query batching: session toggles first, then the test statements.

use crate::model::{QueryBatch, SessionToggles};
use crate::queries::TestItem;

const RESULT_CACHE_SETTING: &str = "enable_result_cache_for_session";
const MV_REWRITE_SETTING: &str = "mv_enable_aqmv_for_session";

fn toggle_statement(setting: &str, enabled: bool) -> String {
    let value = if enabled { "on" } else { "off" };
    format!("set {} to {};", setting, value)
}

/// Build the statements submitted for one test item.
///
/// The result-cache toggle always comes first and the materialized-view rewrite
/// toggle second, so the last element of the batch is the last test statement.
pub fn build_batch(toggles: SessionToggles, item: &TestItem) -> QueryBatch {
    let mut statements = Vec::with_capacity(2 + item.statements().len());
    statements.push(toggle_statement(
        RESULT_CACHE_SETTING,
        toggles.result_cache_enabled,
    ));
    statements.push(toggle_statement(
        MV_REWRITE_SETTING,
        toggles.mv_rewrite_enabled,
    ));
    statements.extend(item.statements().iter().cloned());
    QueryBatch::new(statements)
}
