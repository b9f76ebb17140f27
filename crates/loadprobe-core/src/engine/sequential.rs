use tokio::time::sleep;
use tracing::info;

use super::{log_outcome, mark_timed_out, AttemptRunner};
use crate::model::{AttemptStatus, QueryBatch, RunResult};

pub(crate) async fn run_sequential_impl(
    runner: &AttemptRunner<'_>,
    batch: &QueryBatch,
) -> RunResult {
    info!("Attempts");
    let budget = runner.budget();
    let mut run = RunResult::new();

    for ordinal in 1..=runner.attempts() {
        let Some(mut attempt) = runner.submit(ordinal, batch).await else {
            run.insert(ordinal, None);
            continue;
        };

        let mut wait_cycle = 0;
        while wait_cycle < budget.wait_cycles {
            runner.poll(&mut attempt).await;

            match attempt.status {
                AttemptStatus::Failed | AttemptStatus::Finished => {
                    log_outcome(&attempt);
                    break;
                }
                AttemptStatus::Submitted | AttemptStatus::Running | AttemptStatus::TimedOut => {}
            }

            sleep(budget.sleep_time).await;
            wait_cycle += 1;
        }

        if wait_cycle >= budget.wait_cycles {
            mark_timed_out(&mut attempt);
        }

        run.insert(ordinal, Some(attempt));
    }

    run
}
