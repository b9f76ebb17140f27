//! Attempt execution and polling.
//!
//! Two strategies share the same building blocks:
//!
//! - [`ExecutionMode::Sequential`]: submit, poll to a terminal status or until
//!   the per-attempt budget is spent, then move to the next attempt.
//! - [`ExecutionMode::Concurrent`]: submit every attempt up front, then poll all
//!   outstanding attempts in shared rounds with one sleep per round.

mod concurrent;
mod sequential;

use tracing::{error, info, warn};

use crate::gateway::{GatewayResult, RunTarget, StatementGateway};
use crate::model::{
    Attempt, AttemptSnapshot, AttemptStatus, PollingBudget, QueryBatch, RunResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Concurrent,
}

/// Drives the attempts of one test against a gateway.
pub struct AttemptRunner<'a> {
    gateway: &'a dyn StatementGateway,
    target: &'a RunTarget,
    attempts: u32,
    budget: PollingBudget,
    silent: bool,
}

impl<'a> AttemptRunner<'a> {
    /// `budget.wait_cycles` must be at least 1.
    pub fn new(
        gateway: &'a dyn StatementGateway,
        target: &'a RunTarget,
        attempts: u32,
        budget: PollingBudget,
    ) -> Self {
        Self {
            gateway,
            target,
            attempts,
            budget,
            silent: true,
        }
    }

    /// When not silent, every polled snapshot is logged in full.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub async fn run(&self, mode: ExecutionMode, batch: &QueryBatch) -> RunResult {
        match mode {
            ExecutionMode::Sequential => self.run_sequential(batch).await,
            ExecutionMode::Concurrent => self.run_concurrent(batch).await,
        }
    }

    pub async fn run_sequential(&self, batch: &QueryBatch) -> RunResult {
        sequential::run_sequential_impl(self, batch).await
    }

    pub async fn run_concurrent(&self, batch: &QueryBatch) -> RunResult {
        concurrent::run_concurrent_impl(self, batch).await
    }

    /// Submit one attempt. A failed submission is logged and yields `None`.
    pub(crate) async fn submit(&self, ordinal: u32, batch: &QueryBatch) -> Option<Attempt> {
        match self.gateway.submit_batch(batch, self.target).await {
            Ok(id) => Some(Attempt::submitted(ordinal, id)),
            Err(e) => {
                error!(attempt = ordinal, "{}", e);
                None
            }
        }
    }

    /// Apply a describe outcome. On failure the previous snapshot is kept.
    pub(crate) fn absorb(&self, attempt: &mut Attempt, polled: GatewayResult<AttemptSnapshot>) {
        match polled {
            Ok(snapshot) => {
                attempt.apply(snapshot);
                if !self.silent {
                    info!("- {:?}", attempt);
                }
            }
            Err(e) => {
                warn!(
                    attempt = attempt.ordinal,
                    id = %attempt.id,
                    "describe failed, keeping last known status {}: {}",
                    attempt.status,
                    e
                );
            }
        }
    }

    pub(crate) async fn poll(&self, attempt: &mut Attempt) {
        let polled = self.gateway.describe(&attempt.id).await;
        self.absorb(attempt, polled);
    }

    pub(crate) fn budget(&self) -> PollingBudget {
        self.budget
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn gateway(&self) -> &dyn StatementGateway {
        self.gateway
    }
}

/// Log a terminal attempt.
pub(crate) fn log_outcome(attempt: &Attempt) {
    let line = attempt.status_line();
    match attempt.status {
        AttemptStatus::Failed => {
            info!("{}, {}", line, attempt.error.as_deref().unwrap_or("no error text"));
        }
        AttemptStatus::Finished => {
            if attempt.has_result_set {
                info!("{}, Has result", line);
            } else {
                info!("{}, No result", line);
            }
        }
        AttemptStatus::Submitted | AttemptStatus::Running | AttemptStatus::TimedOut => {
            info!("{}", line);
        }
    }
}

/// Log budget exhaustion with the last observed status, then mark the attempt.
pub(crate) fn mark_timed_out(attempt: &mut Attempt) {
    info!("{}, wait_cycles limit reached", attempt.status_line());
    attempt.status = AttemptStatus::TimedOut;
}
