//! Scripted in-memory gateway shared by the engine, sampler and suite tests.
//!
//! Submission `n` (1-based, counted across the gateway's lifetime) gets the id
//! `stmt-n`, a total duration of `n` seconds and a last sub-statement duration
//! of `n - 0.5` seconds. Each describe call consumes the next scripted step; the
//! final step repeats once the script is exhausted.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use loadprobe_core::{
    Addressing, AttemptSnapshot, AttemptStatus, CellValue, Connector, GatewayError,
    GatewayResult, PollingBudget, QueryBatch, RowSet, RunTarget, StatementGateway, StatementId,
    SubStatement,
};

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Submitted,
    Running,
    Finished { has_result: bool },
    Failed,
    /// The describe call itself errors.
    DescribeError,
}

#[derive(Default)]
struct State {
    submits: u32,
    failing_submissions: HashSet<u32>,
    scripts: HashMap<u32, Vec<Step>>,
    queues: HashMap<String, VecDeque<Step>>,
    batches: HashMap<String, (u32, Vec<String>)>,
    describe_calls: HashMap<String, u32>,
    fetch_calls: Vec<String>,
    connects: u32,
    closes: u32,
}

pub struct ScriptedGateway {
    default_script: Vec<Step>,
    fail_fetch: bool,
    state: Mutex<State>,
}

impl ScriptedGateway {
    pub fn new(default_script: Vec<Step>) -> Self {
        assert!(!default_script.is_empty(), "script needs at least one step");
        Self {
            default_script,
            fail_fetch: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Script for submission `n` instead of the default one.
    pub fn with_script(self, n: u32, script: Vec<Step>) -> Self {
        self.state.lock().unwrap().scripts.insert(n, script);
        self
    }

    pub fn fail_submission(self, n: u32) -> Self {
        self.state.lock().unwrap().failing_submissions.insert(n);
        self
    }

    pub fn fail_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.state.lock().unwrap().submits
    }

    pub fn describe_calls(&self, id: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .describe_calls
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_describe_calls(&self) -> u32 {
        self.state.lock().unwrap().describe_calls.values().sum()
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().fetch_calls.clone()
    }

    pub fn connects(&self) -> u32 {
        self.state.lock().unwrap().connects
    }

    pub fn closes(&self) -> u32 {
        self.state.lock().unwrap().closes
    }

    fn snapshot(n: u32, sqls: &[String], step: Step) -> AttemptSnapshot {
        let (status, has_result, error) = match step {
            Step::Submitted => (AttemptStatus::Submitted, false, None),
            Step::Running => (AttemptStatus::Running, false, None),
            Step::Finished { has_result } => (AttemptStatus::Finished, has_result, None),
            Step::Failed => (
                AttemptStatus::Failed,
                false,
                Some("ERROR: relation \"missing\" does not exist".to_string()),
            ),
            Step::DescribeError => unreachable!("handled by describe"),
        };

        let last = sqls.len();
        let sub_statements = sqls
            .iter()
            .enumerate()
            .map(|(i, sql)| {
                let duration = if i + 1 == last { n as f64 - 0.5 } else { 0.0 };
                let mut sub = SubStatement::new(
                    StatementId::new(format!("stmt-{}:{}", n, i + 1)),
                    sql,
                    duration,
                    status,
                );
                sub.has_result_set = has_result && i + 1 == last;
                sub
            })
            .collect();

        AttemptSnapshot {
            status,
            duration: n as f64,
            has_result_set: has_result,
            error,
            sub_statements,
        }
    }
}

#[async_trait]
impl StatementGateway for ScriptedGateway {
    async fn submit_batch(
        &self,
        batch: &QueryBatch,
        _target: &RunTarget,
    ) -> GatewayResult<StatementId> {
        let mut state = self.state.lock().unwrap();
        state.submits += 1;
        let n = state.submits;
        if state.failing_submissions.contains(&n) {
            return Err(GatewayError::Service {
                code: "ActiveStatementsExceededException".into(),
                message: "too many active statements".into(),
            });
        }
        let id = format!("stmt-{}", n);
        let script = state
            .scripts
            .get(&n)
            .cloned()
            .unwrap_or_else(|| self.default_script.clone());
        state.queues.insert(id.clone(), script.into());
        state
            .batches
            .insert(id.clone(), (n, batch.statements().to_vec()));
        Ok(StatementId::new(id))
    }

    async fn describe(&self, id: &StatementId) -> GatewayResult<AttemptSnapshot> {
        let mut state = self.state.lock().unwrap();
        *state
            .describe_calls
            .entry(id.as_str().to_string())
            .or_insert(0) += 1;

        let queue = state
            .queues
            .get_mut(id.as_str())
            .ok_or_else(|| GatewayError::Service {
                code: "ResourceNotFoundException".into(),
                message: format!("unknown statement {}", id),
            })?;
        let step = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            *queue.front().unwrap()
        };

        if let Step::DescribeError = step {
            return Err(GatewayError::Network {
                message: "connection reset".into(),
            });
        }

        let (n, sqls) = state.batches.get(id.as_str()).cloned().unwrap();
        Ok(Self::snapshot(n, &sqls, step))
    }

    async fn fetch_rows(&self, id: &StatementId) -> GatewayResult<RowSet> {
        let mut state = self.state.lock().unwrap();
        state.fetch_calls.push(id.as_str().to_string());
        if self.fail_fetch {
            return Err(GatewayError::Service {
                code: "ValidationException".into(),
                message: "result expired".into(),
            });
        }
        Ok(RowSet {
            columns: vec!["source".into(), "n".into()],
            rows: (0..5)
                .map(|i| vec![CellValue::String(id.as_str().to_string()), CellValue::Long(i)])
                .collect(),
        })
    }

    async fn close(&self) {
        self.state.lock().unwrap().closes += 1;
    }
}

/// Hands out the same scripted gateway for every test.
pub struct SharedGateway(pub Arc<ScriptedGateway>);

#[async_trait]
impl StatementGateway for SharedGateway {
    async fn submit_batch(
        &self,
        batch: &QueryBatch,
        target: &RunTarget,
    ) -> GatewayResult<StatementId> {
        self.0.submit_batch(batch, target).await
    }

    async fn describe(&self, id: &StatementId) -> GatewayResult<AttemptSnapshot> {
        self.0.describe(id).await
    }

    async fn fetch_rows(&self, id: &StatementId) -> GatewayResult<RowSet> {
        self.0.fetch_rows(id).await
    }

    async fn close(&self) {
        self.0.close().await
    }
}

pub struct ScriptedConnector(pub Arc<ScriptedGateway>);

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> GatewayResult<Box<dyn StatementGateway>> {
        self.0.state.lock().unwrap().connects += 1;
        Ok(Box::new(SharedGateway(self.0.clone())))
    }
}

pub fn target() -> RunTarget {
    RunTarget {
        database: "dev".into(),
        secret_arn: "arn:aws:secretsmanager:us-east-1:123456789012:secret:test".into(),
        addressing: Addressing::Workgroup("default-wg".into()),
    }
}

pub fn budget(wait_cycles: u32) -> PollingBudget {
    paced_budget(wait_cycles, Duration::ZERO)
}

pub fn paced_budget(wait_cycles: u32, sleep_time: Duration) -> PollingBudget {
    PollingBudget {
        wait_cycles,
        sleep_time,
    }
}

pub fn batch() -> QueryBatch {
    QueryBatch::new(vec![
        "set enable_result_cache_for_session to off;".into(),
        "set mv_enable_aqmv_for_session to off;".into(),
        "select venuename from venue;".into(),
    ])
}
