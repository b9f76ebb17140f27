//! Test query file loading.
//!
//! The file is a YAML list. Each element is either a SQL string or a list of
//! SQL strings that is submitted as one batch.

use std::path::Path;

use serde_yaml::Value;
use tracing::info;

/// One declared test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestItem {
    Single(String),
    Group(Vec<String>),
}

impl TestItem {
    pub fn statements(&self) -> &[String] {
        match self {
            TestItem::Single(sql) => std::slice::from_ref(sql),
            TestItem::Group(sqls) => sqls,
        }
    }
}

/// Ordered declared tests of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestDefinition {
    items: Vec<TestItem>,
}

/// Test query file errors. Positions are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum QueryFileError {
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

    #[error("First level of {path} should be a list")]
    NotAList { path: String },

    #[error("First level of {path} should contain list or str (item {item})")]
    InvalidItem { path: String, item: usize },

    #[error("Second level of {path} should contain str (item {item}, statement {statement})")]
    InvalidStatement {
        path: String,
        item: usize,
        statement: usize,
    },
}

impl TestDefinition {
    pub fn new(items: Vec<TestItem>) -> Self {
        Self { items }
    }

    /// Read and validate a test query file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryFileError> {
        let path = path.as_ref();
        info!("Check test queries");
        let content = std::fs::read_to_string(path).map_err(|source| QueryFileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let tests = Self::parse(&content, &path.display().to_string())?;
        info!("- {} test to run", tests.len());
        Ok(tests)
    }

    /// Validate YAML content; `name` is only used in error messages.
    pub fn parse(content: &str, name: &str) -> Result<Self, QueryFileError> {
        let doc: Value = serde_yaml::from_str(content).map_err(|source| QueryFileError::Parse {
            path: name.to_string(),
            source,
        })?;

        let Value::Sequence(entries) = doc else {
            return Err(QueryFileError::NotAList {
                path: name.to_string(),
            });
        };

        let mut items = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let item = match entry {
                Value::String(sql) => TestItem::Single(sql),
                Value::Sequence(group) => {
                    let mut sqls = Vec::with_capacity(group.len());
                    for (j, stmt) in group.into_iter().enumerate() {
                        match stmt {
                            Value::String(sql) => sqls.push(sql),
                            _ => {
                                return Err(QueryFileError::InvalidStatement {
                                    path: name.to_string(),
                                    item: i + 1,
                                    statement: j + 1,
                                })
                            }
                        }
                    }
                    TestItem::Group(sqls)
                }
                _ => {
                    return Err(QueryFileError::InvalidItem {
                        path: name.to_string(),
                        item: i + 1,
                    })
                }
            };
            items.push(item);
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
