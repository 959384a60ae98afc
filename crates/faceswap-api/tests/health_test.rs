//! Status endpoint integration tests.
//!
//! Run with: `cargo test -p faceswap-api --test health_test`

mod helpers;

use helpers::swapper::FakeLoader;
use helpers::{setup_test_app, TestAppBuilder};
use serde_json::Value;

#[tokio::test]
async fn test_home_lists_endpoints() {
    let app = setup_test_app();

    let response = app.client().get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "running");
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e == "POST /swap"));
}

#[tokio::test]
async fn test_health_reports_initializing_until_models_load() {
    let app = setup_test_app();

    let body: Value = app.client().get("/health").await.json();
    assert_eq!(body["status"], "initializing");
    assert_eq!(body["models_loaded"], false);
    assert_eq!(body["cloud_storage"], false);
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());

    app.state.models.get().await.unwrap();

    let body: Value = app.client().get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"], true);
}

#[tokio::test]
async fn test_model_info_does_not_load_models() {
    let app = setup_test_app();

    let response = app.client().get("/model-info").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "initializing");
    assert_eq!(body["models_loaded"], false);
    assert_eq!(body["models"]["detector"], "fake-detector");
    assert_eq!(body["models"]["swapper"], "fake-swapper");
    assert_eq!(body["execution_provider"], "cpu");
    assert!(body["memory_usage_mb"].as_f64().unwrap() > 0.0);
    assert_eq!(app.loader.load_count(), 0);
}

#[tokio::test]
async fn test_benchmark_runs_detection_and_swap() {
    let app = setup_test_app();

    let response = app.client().get("/benchmark").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["faces_detected"], 1);
    assert_eq!(body["image_size"], "100x100");
    assert_eq!(body["models_loaded"], true);
    assert!(body["benchmark_time"].as_f64().unwrap() >= 0.0);
    assert!(app.wait_for_empty_workspace_root().await);
}

#[tokio::test]
async fn test_benchmark_reports_load_failure() {
    let app = TestAppBuilder::new()
        .with_loader(FakeLoader::failing())
        .build();

    let response = app.client().get("/benchmark").await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(body["request_id"].is_string());
    assert!(app.wait_for_empty_workspace_root().await);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();

    let response = app.client().get("/api/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/swap"]["post"].is_object());
}
