//! Data model shared by the engine, the aggregator, the sampler and the sinks.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Opaque statement handle issued by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(String);

impl StatementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an attempt or sub-statement.
///
/// `TimedOut` is never reported by the service; the engine assigns it when the
/// polling budget runs out before a terminal status was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttemptStatus {
    Submitted,
    Running,
    Failed,
    Finished,
    TimedOut,
}

impl AttemptStatus {
    /// FAILED and FINISHED end polling.
    pub fn is_terminal(self) -> bool {
        match self {
            AttemptStatus::Failed | AttemptStatus::Finished => true,
            AttemptStatus::Submitted | AttemptStatus::Running | AttemptStatus::TimedOut => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::Submitted => "SUBMITTED",
            AttemptStatus::Running => "RUNNING",
            AttemptStatus::Failed => "FAILED",
            AttemptStatus::Finished => "FINISHED",
            AttemptStatus::TimedOut => "TIMED_OUT",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapse line breaks so a query fits on one log line or CSV field.
pub fn normalize_query_text(query: &str) -> String {
    query.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// One statement of a submitted batch as reported by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct SubStatement {
    pub id: StatementId,
    /// Query text with newlines collapsed to spaces.
    pub query_string: String,
    /// Seconds.
    pub duration: f64,
    pub status: AttemptStatus,
    /// Status text exactly as the service sent it (e.g. `ABORTED`).
    pub service_status: Option<String>,
    pub has_result_set: bool,
    pub error: Option<String>,
    pub redshift_query_id: Option<i64>,
    pub result_rows: Option<i64>,
    pub result_size: Option<i64>,
    /// RFC 3339.
    pub created_at: Option<String>,
    /// RFC 3339.
    pub updated_at: Option<String>,
}

impl SubStatement {
    /// Status for reports: the service's own text when known.
    pub fn status_text(&self) -> &str {
        self.service_status
            .as_deref()
            .unwrap_or_else(|| self.status.as_str())
    }

    pub fn new(
        id: StatementId,
        query_string: &str,
        duration: f64,
        status: AttemptStatus,
    ) -> Self {
        Self {
            id,
            query_string: normalize_query_text(query_string),
            duration,
            status,
            service_status: None,
            has_result_set: false,
            error: None,
            redshift_query_id: None,
            result_rows: None,
            result_size: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Result of a single describe call.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSnapshot {
    pub status: AttemptStatus,
    /// Seconds.
    pub duration: f64,
    pub has_result_set: bool,
    pub error: Option<String>,
    pub sub_statements: Vec<SubStatement>,
}

/// One execution trial of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub ordinal: u32,
    pub id: StatementId,
    pub status: AttemptStatus,
    /// Seconds.
    pub duration: f64,
    pub has_result_set: bool,
    pub error: Option<String>,
    pub sub_statements: Vec<SubStatement>,
}

impl Attempt {
    /// Freshly submitted attempt, before the first describe.
    pub fn submitted(ordinal: u32, id: StatementId) -> Self {
        Self {
            ordinal,
            id,
            status: AttemptStatus::Submitted,
            duration: 0.0,
            has_result_set: false,
            error: None,
            sub_statements: Vec::new(),
        }
    }

    /// Overwrite the polled state with the latest snapshot.
    pub fn apply(&mut self, snapshot: AttemptSnapshot) {
        self.status = snapshot.status;
        self.duration = snapshot.duration;
        self.has_result_set = snapshot.has_result_set;
        self.error = snapshot.error;
        self.sub_statements = snapshot.sub_statements;
    }

    /// The sub-statement matching the last SQL string of the batch.
    pub fn last_sub_statement(&self) -> Option<&SubStatement> {
        self.sub_statements.last()
    }

    /// `- <ordinal>, <STATUS>, <duration> s`
    pub fn status_line(&self) -> String {
        format!(
            "- {}, {}, {:.4} s",
            self.ordinal, self.status, self.duration
        )
    }
}

/// Ordered statements submitted together as one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBatch(Vec<String>);

impl QueryBatch {
    pub fn new(statements: Vec<String>) -> Self {
        Self(statements)
    }

    pub fn statements(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Session settings prepended to every batch of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionToggles {
    pub result_cache_enabled: bool,
    pub mv_rewrite_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingBudget {
    /// Maximum poll rounds (per attempt when sequential, per test when concurrent).
    pub wait_cycles: u32,
    pub sleep_time: Duration,
}

/// Attempts of one test keyed by ordinal. `None` marks a failed submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    attempts: BTreeMap<u32, Option<Attempt>>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ordinal: u32, attempt: Option<Attempt>) {
        self.attempts.insert(ordinal, attempt);
    }

    pub fn get(&self, ordinal: u32) -> Option<&Attempt> {
        self.attempts.get(&ordinal).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, ordinal: u32) -> Option<&mut Attempt> {
        self.attempts.get_mut(&ordinal).and_then(Option::as_mut)
    }

    pub fn ordinals(&self) -> impl Iterator<Item = u32> + '_ {
        self.attempts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// All ordinals in increasing order, absent submissions included.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&Attempt>)> + '_ {
        self.attempts.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// Attempts that were submitted, in ordinal order.
    pub fn present(&self) -> impl Iterator<Item = &Attempt> + '_ {
        self.attempts.values().filter_map(Option::as_ref)
    }

    /// Attempts that reached FINISHED, in ordinal order.
    pub fn finished(&self) -> impl Iterator<Item = &Attempt> + '_ {
        self.present()
            .filter(|a| a.status == AttemptStatus::Finished)
    }

    /// Status counts over every present attempt.
    pub fn status_histogram(&self) -> BTreeMap<AttemptStatus, usize> {
        let mut counts = BTreeMap::new();
        for attempt in self.present() {
            *counts.entry(attempt.status).or_insert(0) += 1;
        }
        counts
    }
}

/// A decoded result-set cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    /// Base64 as delivered by the service.
    Blob(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("None"),
            CellValue::String(s) | CellValue::Blob(s) => f.write_str(s),
            CellValue::Long(v) => write!(f, "{}", v),
            CellValue::Double(v) => write!(f, "{}", v),
            CellValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// Column-labelled rows fetched for a finished statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RowSet {
    /// Keep at most `n` leading rows.
    pub fn head(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }
}
