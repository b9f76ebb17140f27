//! Attempt execution and polling engine for repeated SQL batch trials.
//!
//! A run takes a list of declared tests (single statements or statement groups),
//! wraps each one in a session-toggle prefix, submits it `attempts` times to an
//! asynchronous statement service and polls every submission until it settles or
//! the polling budget runs out.
//!
//! - [`batch`] builds the statement list submitted for one test
//! - [`gateway`] is the seam to the remote service
//! - [`engine`] drives attempts, sequentially or in lockstep rounds
//! - [`stats`] and [`sample`] summarize the finished attempts
//! - [`sink`] persists every sub-statement of every attempt
//! - [`suite`] ties the pieces together for a whole run
//!
//! # Example
//!
//! ```no_run
//! use loadprobe_core::config::RunConfig;
//! use loadprobe_core::queries::TestDefinition;
//!
//! # fn example() -> anyhow::Result<()> {
//! let cfg = RunConfig::load("config.yml", "dev")?;
//! let tests = TestDefinition::load("test_queries/smoke.yml")?;
//! println!("{} tests, {} attempts each", tests.len(), cfg.attempts);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod model;
pub mod queries;
pub mod report;
pub mod sample;
pub mod sink;
pub mod stats;
pub mod suite;

pub use batch::build_batch;
pub use config::{ClusterType, ConfigError, RunConfig};
pub use engine::{AttemptRunner, ExecutionMode};
pub use gateway::{
    Addressing, Connector, GatewayError, GatewayResult, RunTarget, StatementGateway,
};
pub use model::{
    Attempt, AttemptSnapshot, AttemptStatus, CellValue, PollingBudget, QueryBatch, RowSet,
    RunResult, SessionToggles, StatementId, SubStatement,
};
pub use queries::{QueryFileError, TestDefinition, TestItem};
pub use sample::{sample_records, SHOW_RECS};
pub use sink::{CsvRunSink, RunSink};
pub use stats::{DurationStats, DurationSummary};
pub use suite::{run_suite, SuiteOptions, TestOutcome};
