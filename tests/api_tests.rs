//! Resource facade tests
//!
//! Every operation must hit `{baseUrl}{apiPrefix}{resourcePath}` with the right method

use httpmock::prelude::*;
use quota_manager::services::RecordingNotifier;
use quota_manager::{Api, ApiClient, ConfigResolver, Environment, ListParams, MemoryStorage};
use serde_json::json;
use std::sync::Arc;

const PREFIX: &str = "/quota-manager/api/v1";

fn create_test_api(base_url: &str, entries: &[(&str, &str)]) -> Api {
    let mut all: Vec<(&str, &str)> = vec![("api_base_url", base_url)];
    all.extend_from_slice(entries);

    let storage = MemoryStorage::with_entries(all);
    let resolver = ConfigResolver::new(Arc::new(storage), Environment::default());
    let client = ApiClient::new(resolver, Arc::new(RecordingNotifier::new())).unwrap();
    Api::new(Arc::new(client))
}

fn ok(data: serde_json::Value) -> serde_json::Value {
    json!({"success": true, "data": data})
}

#[tokio::test]
async fn test_get_strategy_by_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/strategies/42", PREFIX));
            then.status(200).json_body(ok(json!({"id": 42, "name": "nightly"})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let strategy = api.strategies.get_strategy("42").await.unwrap();

    mock.assert_async().await;
    assert_eq!(strategy["name"], "nightly");
}

#[tokio::test]
async fn test_list_strategies_with_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/strategies", PREFIX))
                .query_param("page", "2")
                .query_param("page_size", "20")
                .query_param("status", "enabled");
            then.status(200).json_body(ok(json!({"items": [], "total": 0})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let params = ListParams::new().page(2).page_size(20).param("status", "enabled");
    let page = api.strategies.list_strategies(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_create_and_update_strategy() {
    let server = MockServer::start_async().await;
    let body = json!({"name": "weekly top-up", "type": "periodic", "amount": 100});

    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/strategies", PREFIX))
                .json_body(json!({"name": "weekly top-up", "type": "periodic", "amount": 100}));
            then.status(200).json_body(ok(json!({"id": 7})));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(format!("{}/strategies/7", PREFIX))
                .json_body(json!({"name": "weekly top-up", "type": "periodic", "amount": 100}));
            then.status(200).json_body(ok(json!({"id": 7, "updated": true})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let created = api.strategies.create_strategy(&body).await.unwrap();
    let updated = api.strategies.update_strategy("7", &body).await.unwrap();

    create.assert_async().await;
    update.assert_async().await;
    assert_eq!(created["id"], 7);
    assert_eq!(updated["updated"], true);
}

#[tokio::test]
async fn test_strategy_state_operations() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{}/strategies/5", PREFIX));
            then.status(200).json_body(ok(json!(null)));
        })
        .await;
    let enable = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/strategies/5/enable", PREFIX));
            then.status(200).json_body(ok(json!({"status": "enabled"})));
        })
        .await;
    let disable = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/strategies/5/disable", PREFIX));
            then.status(200).json_body(ok(json!({"status": "disabled"})));
        })
        .await;
    let scan = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/strategies/scan", PREFIX));
            then.status(200).json_body(ok(json!({"triggered": true})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    api.strategies.delete_strategy("5").await.unwrap();
    assert_eq!(api.strategies.enable_strategy("5").await.unwrap()["status"], "enabled");
    assert_eq!(api.strategies.disable_strategy("5").await.unwrap()["status"], "disabled");
    assert_eq!(api.strategies.trigger_scan().await.unwrap()["triggered"], true);

    delete.assert_async().await;
    enable.assert_async().await;
    disable.assert_async().await;
    scan.assert_async().await;
}

#[tokio::test]
async fn test_strategy_executions() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/strategies/5/executions", PREFIX))
                .query_param("page", "1");
            then.status(200).json_body(ok(json!([{"id": 1}, {"id": 2}])));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let executions = api
        .strategies
        .get_strategy_executions("5", &ListParams::new().page(1))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(executions.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_identifier_is_one_path_segment() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/strategies/a%2Fb", PREFIX));
            then.status(200).json_body(ok(json!({"id": "a/b"})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let strategy = api.strategies.get_strategy("a/b").await.unwrap();

    mock.assert_async().await;
    assert_eq!(strategy["id"], "a/b");
}

#[tokio::test]
async fn test_quota_endpoints() {
    let server = MockServer::start_async().await;
    let quota = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/quota", PREFIX));
            then.status(200).json_body(ok(json!({"total": 500})));
        })
        .await;
    let audit = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/quota/audit", PREFIX))
                .query_param("page_size", "50");
            then.status(200).json_body(ok(json!({"records": []})));
        })
        .await;
    let user_audit = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/quota/audit/user-17", PREFIX));
            then.status(200).json_body(ok(json!({"records": [{"amount": -5}]})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    assert_eq!(api.quota.get_user_quota().await.unwrap()["total"], 500);
    api.quota
        .get_quota_audit_records(&ListParams::new().page_size(50))
        .await
        .unwrap();
    let records = api
        .quota
        .get_user_quota_audit_records("user-17", &ListParams::new())
        .await
        .unwrap();

    quota.assert_async().await;
    audit.assert_async().await;
    user_audit.assert_async().await;
    assert_eq!(records["records"][0]["amount"], -5);
}

#[tokio::test]
async fn test_quota_transfers() {
    let server = MockServer::start_async().await;
    let out = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/quota/transfer-out", PREFIX))
                .json_body(json!({"receiver_id": "user-2", "amount": 30}));
            then.status(200).json_body(ok(json!({"voucher_code": "V-123"})));
        })
        .await;
    let inbound = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/quota/transfer-in", PREFIX))
                .json_body(json!({"voucher_code": "V-123"}));
            then.status(200).json_body(ok(json!({"amount": 30})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let voucher = api
        .quota
        .transfer_out(&json!({"receiver_id": "user-2", "amount": 30}))
        .await
        .unwrap();
    let received = api
        .quota
        .transfer_in(&json!({"voucher_code": voucher["voucher_code"]}))
        .await
        .unwrap();

    out.assert_async().await;
    inbound.assert_async().await;
    assert_eq!(received["amount"], 30);
}

#[tokio::test]
async fn test_prefix_override_is_used_without_refresh() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/quota");
            then.status(200).json_body(ok(json!({"total": 1})));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[("api_prefix", "/v2")]);
    api.quota.get_user_quota().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_failure_propagates_from_facade() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}/strategies/scan", PREFIX));
            then.status(200)
                .json_body(json!({"success": false, "message": "Scan already running"}));
        })
        .await;

    let api = create_test_api(&server.base_url(), &[]);
    let err = api.strategies.trigger_scan().await.unwrap_err();
    assert!(err.is_application());
    assert_eq!(err.to_string(), "Scan already running");
}
