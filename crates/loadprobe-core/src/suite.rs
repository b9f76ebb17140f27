//! Whole-run orchestration: every declared test, one after another.

use anyhow::Context;
use tracing::{error, info};

use crate::batch::build_batch;
use crate::config::RunConfig;
use crate::engine::AttemptRunner;
use crate::gateway::Connector;
use crate::model::{RowSet, RunResult};
use crate::queries::TestDefinition;
use crate::report::render_rows;
use crate::sample::{sample_records, SHOW_RECS};
use crate::sink::RunSink;
use crate::stats::DurationSummary;

#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Rows shown in the sample dump.
    pub show_recs: usize,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            show_recs: SHOW_RECS,
        }
    }
}

/// Everything produced for one declared test.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// 1-based.
    pub test_no: usize,
    pub run: RunResult,
    pub stats: DurationSummary,
    pub sample: Option<RowSet>,
}

/// Run every declared test. Attempt-level failures never abort the run; only a
/// gateway that cannot be opened does.
pub async fn run_suite(
    cfg: &RunConfig,
    tests: &TestDefinition,
    connector: &dyn Connector,
    sink: &mut dyn RunSink,
    opts: &SuiteOptions,
) -> anyhow::Result<Vec<TestOutcome>> {
    let target = cfg.target();
    let mut outcomes = Vec::with_capacity(tests.len());

    for (i, item) in tests.items().iter().enumerate() {
        let test_no = i + 1;
        info!("Test {}", test_no);

        let batch = build_batch(cfg.toggles(), item);
        for statement in batch.statements() {
            info!("- {}", statement.trim());
        }

        let gateway = connector
            .connect()
            .await
            .with_context(|| format!("failed to open statement gateway for test {}", test_no))?;

        let runner = AttemptRunner::new(gateway.as_ref(), &target, cfg.attempts, cfg.budget())
            .with_silent(cfg.silent);
        let run = runner.run(cfg.mode(), &batch).await;

        let stats = DurationSummary::from_attempts(run.finished());
        stats.log();

        let mut sample = None;
        if run.finished().next().is_some() {
            info!("Sample records");
            sample = sample_records(gateway.as_ref(), run.finished(), opts.show_recs).await;
            if let Some(rows) = &sample {
                info!("\n{}", render_rows(rows));
            }
        }

        if let Err(e) = sink.record(test_no, &run) {
            error!(test = test_no, "failed to record run details: {:#}", e);
        }

        gateway.close().await;

        outcomes.push(TestOutcome {
            test_no,
            run,
            stats,
            sample,
        });
    }

    Ok(outcomes)
}
