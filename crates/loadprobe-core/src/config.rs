//! Run configuration.
//!
//! `config.yml` holds one named target per top-level key:
//!
//! ```yaml
//! dev:
//!   clusterid_or_workgroupname: analytics-wg
//!   type: serverless
//!   dbname: dev
//!   secret_arn: arn:aws:secretsmanager:eu-west-1:123456789012:secret:dev
//!   attempts: 10
//!   synchronous: false
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::ExecutionMode;
use crate::gateway::{Addressing, RunTarget};
use crate::model::{PollingBudget, SessionToggles};

pub const MAX_ATTEMPTS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterType {
    Provisioned,
    Serverless,
}

impl std::fmt::Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterType::Provisioned => f.write_str("provisioned"),
            ClusterType::Serverless => f.write_str("serverless"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub clusterid_or_workgroupname: String,
    #[serde(rename = "type")]
    pub cluster_type: ClusterType,
    pub dbname: String,
    pub secret_arn: String,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_wait_cycles")]
    pub wait_cycles: u32,
    /// Seconds between poll rounds.
    #[serde(default = "default_sleep_time")]
    pub sleep_time: u64,
    #[serde(default = "default_true")]
    pub synchronous: bool,
    #[serde(default = "default_true")]
    pub silent: bool,
    #[serde(default)]
    pub resultcache: bool,
    #[serde(default)]
    pub mvrewrite: bool,
}

fn default_attempts() -> u32 {
    1
}

fn default_wait_cycles() -> u32 {
    5
}

fn default_sleep_time() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{source} while reading {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source} while parsing {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing target {target} in {path}")]
    MissingTarget { target: String, path: String },

    #[error("Invalid target {target} in {path}: {source}")]
    InvalidTarget {
        target: String,
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing {bound} value for {param} in {path} (got {value})")]
    OutOfRange {
        param: &'static str,
        value: u64,
        bound: String,
        path: String,
    },
}

impl RunConfig {
    /// Read `path` and select `target`.
    pub fn load(path: impl AsRef<Path>, target: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Check run configurations");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_yaml(&content, target, &path.display().to_string())?;
        cfg.log_effective();
        Ok(cfg)
    }

    /// Parse and validate one target out of YAML content.
    pub fn from_yaml(content: &str, target: &str, path: &str) -> Result<Self, ConfigError> {
        let mut targets: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;

        let raw = targets
            .remove(target)
            .ok_or_else(|| ConfigError::MissingTarget {
                target: target.to_string(),
                path: path.to_string(),
            })?;

        let cfg: RunConfig =
            serde_yaml::from_value(raw).map_err(|source| ConfigError::InvalidTarget {
                target: target.to_string(),
                path: path.to_string(),
                source,
            })?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    fn validate(&self, path: &str) -> Result<(), ConfigError> {
        let out_of_range = |param: &'static str, value: u64, bound: String| ConfigError::OutOfRange {
            param,
            value,
            bound,
            path: path.to_string(),
        };

        if self.attempts < 1 {
            return Err(out_of_range(
                "attempts",
                self.attempts.into(),
                "greater than or equal to 1".into(),
            ));
        }
        if self.attempts > MAX_ATTEMPTS {
            return Err(out_of_range(
                "attempts",
                self.attempts.into(),
                format!("lesser than or equal to {}", MAX_ATTEMPTS),
            ));
        }
        if self.wait_cycles < 1 {
            return Err(out_of_range(
                "wait_cycles",
                self.wait_cycles.into(),
                "greater than or equal to 1".into(),
            ));
        }
        if self.sleep_time < 1 {
            return Err(out_of_range(
                "sleep_time",
                self.sleep_time,
                "greater than or equal to 1".into(),
            ));
        }
        Ok(())
    }

    pub fn budget(&self) -> PollingBudget {
        PollingBudget {
            wait_cycles: self.wait_cycles,
            sleep_time: Duration::from_secs(self.sleep_time),
        }
    }

    pub fn toggles(&self) -> SessionToggles {
        SessionToggles {
            result_cache_enabled: self.resultcache,
            mv_rewrite_enabled: self.mvrewrite,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        if self.synchronous {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Concurrent
        }
    }

    pub fn target(&self) -> RunTarget {
        let addressing = match self.cluster_type {
            ClusterType::Provisioned => {
                Addressing::Cluster(self.clusterid_or_workgroupname.clone())
            }
            ClusterType::Serverless => {
                Addressing::Workgroup(self.clusterid_or_workgroupname.clone())
            }
        };
        RunTarget {
            database: self.dbname.clone(),
            secret_arn: self.secret_arn.clone(),
            addressing,
        }
    }

    /// Log every effective parameter, defaults included.
    pub fn log_effective(&self) {
        let params: [(&str, String); 11] = [
            (
                "clusterid_or_workgroupname",
                self.clusterid_or_workgroupname.clone(),
            ),
            ("type", self.cluster_type.to_string()),
            ("dbname", self.dbname.clone()),
            ("secret_arn", self.secret_arn.clone()),
            ("attempts", self.attempts.to_string()),
            ("wait_cycles", self.wait_cycles.to_string()),
            ("sleep_time", self.sleep_time.to_string()),
            ("synchronous", self.synchronous.to_string()),
            ("silent", self.silent.to_string()),
            ("resultcache", self.resultcache.to_string()),
            ("mvrewrite", self.mvrewrite.to_string()),
        ];
        for (name, value) in params {
            info!("- {:<26} : {}", name, value);
        }
    }
}
