use super::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> WarehouseConfig {
    let uri = url::Url::parse(&server.uri()).expect("mock server URI should parse");
    WarehouseConfig {
        protocol: "http".to_string(),
        host: uri.host_str().expect("mock server should have host").to_string(),
        port: uri.port().expect("mock server should have port"),
        user: "analyst".to_string(),
        password: "hunter2".to_string(),
        account: "test-account".to_string(),
        warehouse: "COMPUTE_WH".to_string(),
        database: "TFO".to_string(),
        schema: "TFO_SCHEMA".to_string(),
        role: None,
    }
}

fn success_body(columns: &[&str], data: serde_json::Value) -> serde_json::Value {
    json!({
        "resultSetMetaData": {
            "rowType": columns.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>()
        },
        "data": data,
        "code": "090001",
        "message": "Statement executed successfully."
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_parses_columns_and_rows() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_string_contains("SELECT COUNT(*)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
            &["COUNT(*)"],
            json!([["42"]]),
        )))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let table = tokio::task::spawn_blocking(move || {
        client.execute("SELECT COUNT(*) FROM \"ASSETMASTER\"")
    })
    .await
    .expect("task should not panic")
    .expect("Query should succeed");

    assert_eq!(table.columns, vec!["COUNT(*)"]);
    assert_eq!(table.scalar_i64(), Some(42));
}

#[tokio::test(flavor = "multi_thread")]
async fn session_context_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(header("X-Snowflake-Account", "test-account"))
        .and(body_string_contains("\"database\":\"TFO\""))
        .and(body_string_contains("\"schema\":\"TFO_SCHEMA\""))
        .and(body_string_contains("\"warehouse\":\"COMPUTE_WH\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[], json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let result = tokio::task::spawn_blocking(move || client.execute("SELECT 1"))
        .await
        .expect("task should not panic");

    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_relation_is_a_warehouse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "002003",
            "message": "SQL compilation error: Object 'MISSING_clean_view' does not exist.",
        })))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let result = tokio::task::spawn_blocking(move || {
        client.execute("SELECT COUNT(*) FROM \"MISSING_clean_view\"")
    })
    .await
    .expect("task should not panic");

    match result {
        Err(DqError::Warehouse(message)) => {
            assert!(message.contains("does not exist"), "{}", message);
            assert!(message.contains("002003"), "{}", message);
        }
        other => panic!("Expected warehouse error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_are_a_permission_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Authentication failed."
        })))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let result = tokio::task::spawn_blocking(move || client.execute("SELECT 1"))
        .await
        .expect("task should not panic");

    assert!(matches!(result, Err(DqError::Permission(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_binds_parameters_and_returns_first_cell() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_string_contains("SNOWFLAKE.CORTEX.COMPLETE"))
        .and(body_string_contains("snowflake-llama-3.3-70b"))
        .and(body_string_contains("describe the table"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
            &["SNOWFLAKE.CORTEX.COMPLETE"],
            json!([["The ASSETMASTER table holds one row per asset."]]),
        )))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let text = tokio::task::spawn_blocking(move || {
        client.complete("snowflake-llama-3.3-70b", "describe the table", 8192)
    })
    .await
    .expect("task should not panic")
    .expect("Completion should succeed");

    assert_eq!(text, "The ASSETMASTER table holds one row per asset.");
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_without_usage_rights_is_a_permission_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "003001",
            "message": "SQL access control error: Insufficient privileges to operate on function 'COMPLETE'",
        })))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let result = tokio::task::spawn_blocking(move || client.complete("model", "prompt", 64))
        .await
        .expect("task should not panic");

    match result {
        Err(DqError::Permission(message)) => {
            assert!(message.contains("USAGE"), "{}", message);
        }
        other => panic!("Expected permission error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_completion_result_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[], json!([]))))
        .mount(&server)
        .await;

    let client = WarehouseClient::new(&config_for(&server)).expect("Failed to create client");
    let result = tokio::task::spawn_blocking(move || client.complete("model", "prompt", 64))
        .await
        .expect("task should not panic");

    assert!(matches!(result, Err(DqError::Warehouse(_))));
}

#[test]
fn scalar_parses_string_counts() {
    let table = ResultTable {
        columns: vec!["COUNT(*)".to_string()],
        rows: vec![vec![Value::String("128".to_string())]],
    };
    assert_eq!(table.scalar_i64(), Some(128));

    let table = ResultTable {
        columns: vec!["COUNT(*)".to_string()],
        rows: vec![vec![json!(7)]],
    };
    assert_eq!(table.scalar_i64(), Some(7));

    let empty = ResultTable {
        columns: Vec::new(),
        rows: Vec::new(),
    };
    assert_eq!(empty.scalar_i64(), None);
    assert!(empty.is_empty());
}

#[test]
fn unwrap_completion_passes_plain_text_through() {
    assert_eq!(unwrap_completion("plain answer"), "plain answer");
}

#[test]
fn unwrap_completion_unwraps_choices_envelope() {
    let raw = r#"{"choices":[{"messages":"First line.\\n\\nSecond line.\\nThird."}]}"#;
    assert_eq!(
        unwrap_completion(raw),
        "First line.\n\nSecond line.\nThird."
    );
}

#[test]
fn unwrap_completion_normalizes_escaped_newlines_in_plain_text() {
    assert_eq!(unwrap_completion("a\\nb"), "a\nb");
}
