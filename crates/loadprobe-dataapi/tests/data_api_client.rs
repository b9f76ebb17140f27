//! Integration tests for DataApiClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover request shape and signing
//! headers, status and duration decoding, row decoding and error mapping.

use loadprobe_core::{
    Addressing, AttemptStatus, CellValue, Connector, GatewayError, QueryBatch, RunTarget,
    StatementGateway, StatementId,
};
use loadprobe_dataapi::{Credentials, DataApiClient, DataApiConfig, DataApiConnector, AMZ_JSON};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(mock_server: &MockServer) -> DataApiConfig {
    DataApiConfig::default()
        .with_endpoint(mock_server.uri())
        .with_region("eu-west-1")
        .with_credentials(Credentials::new("AKIDEXAMPLE", "secret"))
}

fn create_test_client(mock_server: &MockServer) -> DataApiClient {
    DataApiClient::new(config(mock_server)).expect("failed to create client")
}

fn workgroup_target() -> RunTarget {
    RunTarget {
        database: "dev".into(),
        secret_arn: "arn:aws:secretsmanager:eu-west-1:123456789012:secret:dev".into(),
        addressing: Addressing::Workgroup("analytics-wg".into()),
    }
}

fn batch() -> QueryBatch {
    QueryBatch::new(vec![
        "set enable_result_cache_for_session to off;".into(),
        "set mv_enable_aqmv_for_session to off;".into(),
        "select 1;".into(),
    ])
}

#[tokio::test]
async fn test_submit_batch_workgroup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", AMZ_JSON))
        .and(header("x-amz-target", "RedshiftData.BatchExecuteStatement"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(body_partial_json(json!({
            "Database": "dev",
            "WorkgroupName": "analytics-wg",
            "Sqls": [
                "set enable_result_cache_for_session to off;",
                "set mv_enable_aqmv_for_session to off;",
                "select 1;"
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "d9b6c0c9-0747-4bf4-b142-e8883122f766",
            "Database": "dev",
            "WorkgroupName": "analytics-wg"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let id = client
        .submit_batch(&batch(), &workgroup_target())
        .await
        .expect("submit failed");
    assert_eq!(id.as_str(), "d9b6c0c9-0747-4bf4-b142-e8883122f766");
}

#[tokio::test]
async fn test_submit_batch_cluster_omits_workgroup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "ClusterIdentifier": "redshift-cluster-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Id": "c-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = RunTarget {
        addressing: Addressing::Cluster("redshift-cluster-1".into()),
        ..workgroup_target()
    };
    let client = create_test_client(&mock_server);
    client.submit_batch(&batch(), &target).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("WorkgroupName").is_none());
}

#[tokio::test]
async fn test_session_token_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-security-token", "session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Id": "t-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server).with_credentials(
        Credentials::new("AKIDEXAMPLE", "secret").with_session_token("session-token"),
    );
    let client = DataApiClient::new(config).unwrap();
    client
        .submit_batch(&batch(), &workgroup_target())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_describe_statement() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "RedshiftData.DescribeStatement"))
        .and(body_partial_json(json!({ "Id": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "abc",
            "Status": "FINISHED",
            "Duration": 3_250_000_000i64,
            "HasResultSet": true,
            "SubStatements": [
                {"Id": "abc:1", "QueryString": "set enable_result_cache_for_session to off;", "Duration": 1_000_000, "Status": "FINISHED", "HasResultSet": false},
                {"Id": "abc:2", "QueryString": "set mv_enable_aqmv_for_session to off;", "Duration": 1_000_000, "Status": "FINISHED", "HasResultSet": false},
                {"Id": "abc:3", "QueryString": "select venuename\nfrom venue;", "Duration": 3_000_000_000i64, "Status": "FINISHED", "HasResultSet": true, "ResultRows": 202, "RedshiftQueryId": 4721}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let snap = client.describe(&StatementId::new("abc")).await.unwrap();

    assert_eq!(snap.status, AttemptStatus::Finished);
    assert_eq!(snap.duration, 3.25);
    assert!(snap.has_result_set);
    let last = snap.sub_statements.last().unwrap();
    assert_eq!(last.id.as_str(), "abc:3");
    assert_eq!(last.duration, 3.0);
    assert_eq!(last.query_string, "select venuename from venue;");
    assert_eq!(last.result_rows, Some(202));
    assert_eq!(last.redshift_query_id, Some(4721));
}

#[tokio::test]
async fn test_describe_failed_statement() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "abc",
            "Status": "FAILED",
            "Duration": -1,
            "Error": "ERROR: relation \"venue\" does not exist",
            "SubStatements": []
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let snap = client.describe(&StatementId::new("abc")).await.unwrap();
    assert_eq!(snap.status, AttemptStatus::Failed);
    assert_eq!(snap.duration, 0.0);
    assert!(snap.error.unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_describe_unknown_status_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "Id": "abc", "Status": "PAUSED" })),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.describe(&StatementId::new("abc")).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_fetch_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "RedshiftData.GetStatementResult"))
        .and(body_partial_json(json!({ "Id": "abc:3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ColumnMetadata": [{"name": "venuename", "typeName": "varchar"}, {"name": "venueseats", "typeName": "int4"}],
            "Records": [
                [{"stringValue": "Arena"}, {"longValue": 18000}],
                [{"stringValue": "Hall"}, {"isNull": true}]
            ],
            "TotalNumRows": 2,
            "NextToken": "page-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let rows = client.fetch_rows(&StatementId::new("abc:3")).await.unwrap();

    assert_eq!(rows.columns, vec!["venuename", "venueseats"]);
    assert_eq!(rows.rows.len(), 2);
    assert_eq!(rows.rows[0][1], CellValue::Long(18000));
    assert_eq!(rows.rows[1][1], CellValue::Null);
}

#[tokio::test]
async fn test_service_error_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.redshiftdata#ValidationException",
            "message": "Either ClusterIdentifier or WorkgroupName must be specified"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client
        .submit_batch(&batch(), &workgroup_target())
        .await
        .unwrap_err();
    match err {
        GatewayError::Service { code, message } => {
            assert_eq!(code, "ValidationException");
            assert!(message.contains("WorkgroupName"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.describe(&StatementId::new("abc")).await.unwrap_err();
    match err {
        GatewayError::Service { code, message } => {
            assert_eq!(code, "UnknownError");
            assert_eq!(message, "HTTP 503");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_undecodable_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.describe(&StatementId::new("abc")).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_network_error() {
    let mock_server = MockServer::start().await;
    let config = config(&mock_server);
    drop(mock_server);

    let client = DataApiClient::new(config).unwrap();
    let err = client.describe(&StatementId::new("abc")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Network { .. }));
}

#[tokio::test]
async fn test_connector_builds_working_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-amz-target", "RedshiftData.DescribeStatement"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "Id": "abc", "Status": "STARTED" })),
        )
        .mount(&mock_server)
        .await;

    let connector = DataApiConnector::new(config(&mock_server));
    let gateway = connector.connect().await.unwrap();
    let snap = gateway.describe(&StatementId::new("abc")).await.unwrap();
    assert_eq!(snap.status, AttemptStatus::Running);
    gateway.close().await;
}

#[tokio::test]
async fn test_endpoint_path_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/redshift-data/"))
        .and(header("x-amz-target", "RedshiftData.DescribeStatement"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "Id": "abc", "Status": "FINISHED" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server).with_endpoint(format!("{}/redshift-data/", mock_server.uri()));
    let client = DataApiClient::new(config).unwrap();
    assert_eq!(client.endpoint().path(), "/redshift-data/");
    let snap = client.describe(&StatementId::new("abc")).await.unwrap();
    assert_eq!(snap.status, AttemptStatus::Finished);
}
