//! Wire types for the Redshift Data API JSON protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loadprobe_core::{AttemptSnapshot, AttemptStatus, CellValue, RowSet, StatementId, SubStatement};

use crate::error::{DataApiError, DataApiResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BatchExecuteStatementRequest<'a> {
    pub sqls: &'a [String],
    pub database: &'a str,
    pub secret_arn: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_identifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_name: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BatchExecuteStatementResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StatementIdRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeStatementResponse {
    pub status: String,
    /// Nanoseconds.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub has_result_set: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sub_statements: Vec<SubStatementData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SubStatementData {
    pub id: String,
    #[serde(default)]
    pub query_string: String,
    #[serde(default)]
    pub duration: i64,
    pub status: String,
    #[serde(default)]
    pub has_result_set: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redshift_query_id: Option<i64>,
    #[serde(default)]
    pub result_rows: Option<i64>,
    #[serde(default)]
    pub result_size: Option<i64>,
    /// Epoch seconds or an ISO timestamp, depending on the serializer.
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
    #[serde(default)]
    pub updated_at: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetStatementResultResponse {
    #[serde(default)]
    pub column_metadata: Vec<ColumnMetadata>,
    #[serde(default)]
    pub records: Vec<Vec<Field>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ColumnMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// A single record cell. The service sets exactly one of these members.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Field {
    pub is_null: Option<bool>,
    pub string_value: Option<String>,
    pub long_value: Option<i64>,
    pub double_value: Option<f64>,
    pub boolean_value: Option<bool>,
    pub blob_value: Option<String>,
}

/// Exception body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Exception name without the `namespace#` prefix.
    pub fn code(&self) -> String {
        match &self.kind {
            Some(kind) => kind.rsplit('#').next().unwrap_or(kind).to_string(),
            None => "UnknownError".to_string(),
        }
    }
}

/// Map a wire status onto the engine's status set.
pub(crate) fn map_status(raw: &str) -> DataApiResult<AttemptStatus> {
    match raw {
        "SUBMITTED" | "PICKED" => Ok(AttemptStatus::Submitted),
        "STARTED" => Ok(AttemptStatus::Running),
        "FINISHED" => Ok(AttemptStatus::Finished),
        "FAILED" | "ABORTED" => Ok(AttemptStatus::Failed),
        other => Err(DataApiError::InvalidResponse {
            message: format!("unknown statement status {}", other),
        }),
    }
}

fn nanos_to_secs(ns: i64) -> f64 {
    // The service reports -1 before a statement has run.
    if ns <= 0 {
        0.0
    } else {
        ns as f64 / 1e9
    }
}

/// Timestamps arrive as epoch seconds (with fraction); render them as RFC 3339.
fn timestamp_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Number(n) => {
            let millis = (n.as_f64()? * 1000.0).round() as i64;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|t| t.to_rfc3339())
        }
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }
}

impl SubStatementData {
    fn into_sub_statement(self) -> DataApiResult<SubStatement> {
        let status = map_status(&self.status)?;
        let mut sub = SubStatement::new(
            StatementId::new(self.id),
            &self.query_string,
            nanos_to_secs(self.duration),
            status,
        );
        sub.service_status = Some(self.status);
        sub.has_result_set = self.has_result_set;
        sub.error = self.error;
        sub.redshift_query_id = self.redshift_query_id;
        sub.result_rows = self.result_rows;
        sub.result_size = self.result_size;
        sub.created_at = timestamp_text(self.created_at);
        sub.updated_at = timestamp_text(self.updated_at);
        Ok(sub)
    }
}

impl DescribeStatementResponse {
    pub fn into_snapshot(self) -> DataApiResult<AttemptSnapshot> {
        let status = map_status(&self.status)?;
        let sub_statements = self
            .sub_statements
            .into_iter()
            .map(SubStatementData::into_sub_statement)
            .collect::<DataApiResult<Vec<_>>>()?;
        Ok(AttemptSnapshot {
            status,
            duration: nanos_to_secs(self.duration),
            has_result_set: self.has_result_set,
            error: self.error,
            sub_statements,
        })
    }
}

impl Field {
    fn into_cell(self) -> CellValue {
        if self.is_null == Some(true) {
            return CellValue::Null;
        }
        if let Some(v) = self.string_value {
            return CellValue::String(v);
        }
        if let Some(v) = self.long_value {
            return CellValue::Long(v);
        }
        if let Some(v) = self.double_value {
            return CellValue::Double(v);
        }
        if let Some(v) = self.boolean_value {
            return CellValue::Boolean(v);
        }
        if let Some(v) = self.blob_value {
            return CellValue::Blob(v);
        }
        CellValue::Null
    }
}

impl GetStatementResultResponse {
    pub fn into_row_set(self) -> RowSet {
        RowSet {
            columns: self
                .column_metadata
                .into_iter()
                .map(|c| {
                    if c.name.is_empty() {
                        c.label.unwrap_or_default()
                    } else {
                        c.name
                    }
                })
                .collect(),
            rows: self
                .records
                .into_iter()
                .map(|record| record.into_iter().map(Field::into_cell).collect())
                .collect(),
        }
    }
}
