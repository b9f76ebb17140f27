//! Run details persistence: one CSV row per sub-statement of every attempt.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::{RunResult, SubStatement};

const COLUMNS: [&str; 13] = [
    "Test",
    "Attempt",
    "Id",
    "QueryString",
    "Duration",
    "Status",
    "HasResultSet",
    "Error",
    "RedshiftQueryId",
    "ResultRows",
    "ResultSize",
    "CreatedAt",
    "UpdatedAt",
];

/// Receives every attempt of every test, whatever its outcome.
pub trait RunSink {
    /// `test_no` is 1-based.
    fn record(&mut self, test_no: usize, run: &RunResult) -> anyhow::Result<()>;
}

/// Comma-separated run details file. Rows are flushed after each test.
pub struct CsvRunSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvRunSink {
    /// Create the file (and its directory) and write the header.
    pub fn create(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", COLUMNS.join(","))?;
        writer.flush()?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunSink for CsvRunSink {
    fn record(&mut self, test_no: usize, run: &RunResult) -> anyhow::Result<()> {
        for attempt in run.present() {
            for sub in &attempt.sub_statements {
                let line = csv_line(test_no, attempt.ordinal, sub);
                writeln!(self.writer, "{}", line)
                    .with_context(|| format!("failed to write {}", self.path.display()))?;
            }
        }
        self.writer
            .flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;
        Ok(())
    }
}

fn csv_line(test_no: usize, attempt: u32, sub: &SubStatement) -> String {
    let opt = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
    let fields = [
        test_no.to_string(),
        attempt.to_string(),
        sub.id.to_string(),
        sub.query_string.clone(),
        sub.duration.to_string(),
        sub.status_text().to_string(),
        sub.has_result_set.to_string(),
        sub.error.clone().unwrap_or_default(),
        opt(sub.redshift_query_id),
        opt(sub.result_rows),
        opt(sub.result_size),
        sub.created_at.clone().unwrap_or_default(),
        sub.updated_at.clone().unwrap_or_default(),
    ];
    fields
        .iter()
        .map(|f| qualify(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field when it contains a delimiter, quote or line break.
fn qualify(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
