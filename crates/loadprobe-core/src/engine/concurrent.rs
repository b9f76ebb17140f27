use std::collections::BTreeMap;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info};

use super::{log_outcome, mark_timed_out, AttemptRunner};
use crate::model::{AttemptStatus, QueryBatch, RunResult, StatementId};

pub(crate) async fn run_concurrent_impl(
    runner: &AttemptRunner<'_>,
    batch: &QueryBatch,
) -> RunResult {
    info!("Attempts");
    let budget = runner.budget();
    let mut run = RunResult::new();

    // Submission phase: no waiting between attempts.
    for ordinal in 1..=runner.attempts() {
        let attempt = runner.submit(ordinal, batch).await;
        if attempt.is_some() {
            info!("- {}, {}", ordinal, AttemptStatus::Submitted);
        }
        run.insert(ordinal, attempt);
    }

    // Polling phase: one round counter and one sleep per round for all attempts.
    let mut rounds = 0;
    while rounds < budget.wait_cycles {
        let pending: Vec<(u32, StatementId)> = run
            .present()
            .filter(|a| !a.status.is_terminal())
            .map(|a| (a.ordinal, a.id.clone()))
            .collect();

        let polled = join_all(
            pending
                .iter()
                .map(|(_, id)| runner.gateway().describe(id)),
        )
        .await;

        for ((ordinal, _), result) in pending.into_iter().zip(polled) {
            if let Some(attempt) = run.get_mut(ordinal) {
                runner.absorb(attempt, result);
            }
        }

        let histogram = run.status_histogram();
        if !histogram.is_empty() {
            info!("- {}", format_histogram(&histogram));
        }

        if histogram.keys().all(|status| status.is_terminal()) {
            break;
        }

        sleep(budget.sleep_time).await;
        rounds += 1;
    }
    debug!(rounds, wait_cycles = budget.wait_cycles, "polling phase done");

    // Reporting phase.
    let ordinals: Vec<u32> = run.ordinals().collect();
    for ordinal in ordinals {
        let Some(attempt) = run.get_mut(ordinal) else {
            info!("- {}, NOT SUBMITTED", ordinal);
            continue;
        };
        match attempt.status {
            AttemptStatus::Failed | AttemptStatus::Finished => log_outcome(attempt),
            AttemptStatus::Submitted | AttemptStatus::Running | AttemptStatus::TimedOut => {
                mark_timed_out(attempt)
            }
        }
    }

    run
}

/// `FINISHED: 2, RUNNING: 1` style summary.
pub(crate) fn format_histogram(histogram: &BTreeMap<AttemptStatus, usize>) -> String {
    histogram
        .iter()
        .map(|(status, count)| format!("{}: {}", status, count))
        .collect::<Vec<_>>()
        .join(", ")
}
