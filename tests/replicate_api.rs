//! Wire-level tests for the Replicate provider against a mock HTTP server.

use glass_ai::{GenerationRequest, GlassError, ImageProvider, ReplicateProvider};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn provider_for(server: &MockServer) -> ReplicateProvider {
    ReplicateProvider::builder()
        .api_token("test-token")
        .base_url(server.base_url())
        .poll_interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
        .max_polls(3)
        .build()
        .unwrap()
}

#[tokio::test]
async fn immediate_success_returns_first_output_url() {
    let server = MockServer::start_async().await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/predictions")
                .header("authorization", "Bearer test-token");
            then.status(201).json_body(json!({
                "id": "p1",
                "status": "succeeded",
                "output": ["https://example/img123.png", "https://example/img124.png"]
            }));
        })
        .await;

    let provider = provider_for(&server);
    let result = provider
        .generate(&GenerationRequest::new("a red cube on a white background"))
        .await
        .unwrap();

    assert_eq!(result.image_url, "https://example/img123.png");
    assert!(result.image_path.is_none());
    // A prediction that is already terminal costs no status fetches.
    assert_eq!(submit.hits_async().await, 1);
}

#[tokio::test]
async fn submission_rejection_is_an_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predictions");
            then.status(500).json_body(json!({ "detail": "boom" }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .generate(&GenerationRequest::new("a red cube"))
        .await
        .unwrap_err();

    match err {
        GlassError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predictions");
            then.status(401).json_body(json!({ "detail": "Invalid token" }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .generate(&GenerationRequest::new("a red cube"))
        .await
        .unwrap_err();

    assert!(matches!(err, GlassError::Auth(_)));
}

#[tokio::test]
async fn failed_prediction_surfaces_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predictions");
            then.status(201).json_body(json!({
                "id": "p1",
                "status": "starting",
                "urls": { "get": server.url("/predictions/p1") }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/predictions/p1");
            then.status(200).json_body(json!({
                "id": "p1",
                "status": "failed",
                "error": "NSFW content detected"
            }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .generate(&GenerationRequest::new("a red cube"))
        .await
        .unwrap_err();

    match err {
        GlassError::GenerationFailed(message) => {
            assert_eq!(message, "NSFW content detected");
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn succeeded_with_empty_output_is_empty_output() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predictions");
            then.status(201).json_body(json!({
                "id": "p1",
                "status": "succeeded",
                "output": []
            }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .generate(&GenerationRequest::new("a red cube"))
        .await
        .unwrap_err();

    assert!(matches!(err, GlassError::EmptyOutput));
}

#[tokio::test]
async fn stuck_prediction_times_out_after_max_polls() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predictions");
            then.status(201).json_body(json!({
                "id": "p1",
                "status": "starting",
                "urls": { "get": server.url("/predictions/p1") }
            }));
        })
        .await;
    let poll = server
        .mock_async(|when, then| {
            when.method(GET).path("/predictions/p1");
            then.status(200).json_body(json!({
                "id": "p1",
                "status": "processing"
            }));
        })
        .await;

    let provider = provider_for(&server);
    let err = provider
        .generate(&GenerationRequest::new("a red cube"))
        .await
        .unwrap_err();

    assert!(matches!(err, GlassError::Timeout(_)));
    // max_polls = 3: the third status fetch exhausts the budget.
    assert_eq!(poll.hits_async().await, 3);
}
