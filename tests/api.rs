//! End-to-end tests for the HTTP boundary, with the provider stubbed out.

use async_trait::async_trait;
use glass_ai::error::Result;
use glass_ai::server::{router, AppState, ErrorResponse, GenerateRequest, GenerateResponse};
use glass_ai::{GenerationRequest, GenerationResult, GlassError, ImageProvider, ImageStore};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;

enum Outcome {
    Succeed(String),
    Fail(String),
    TimeOut,
}

struct StubProvider {
    outcome: Outcome,
}

#[async_trait]
impl ImageProvider for StubProvider {
    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult> {
        match &self.outcome {
            Outcome::Succeed(url) => Ok(GenerationResult::new(url.clone())),
            Outcome::Fail(message) => Err(GlassError::GenerationFailed(message.clone())),
            Outcome::TimeOut => Err(GlassError::Timeout(Duration::from_secs(120))),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

async fn spawn_app(outcome: Outcome, store: Option<ImageStore>) -> String {
    let state = AppState::new(Arc::new(StubProvider { outcome }), store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn post_prompt(base: &str, prompt: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&GenerateRequest {
            prompt: prompt.into(),
        })
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn success_returns_image_url() {
    let base = spawn_app(
        Outcome::Succeed("https://example/img123.png".into()),
        None,
    )
    .await;

    let response = post_prompt(&base, "a red cube on a white background").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body.get("success").unwrap(), true);
    assert_eq!(body.get("imageUrl").unwrap(), "https://example/img123.png");
    // No store configured, so persistence is skipped entirely.
    assert!(body.get("imagePath").is_none());
}

#[tokio::test]
async fn failure_returns_500_with_error_shape() {
    let base = spawn_app(Outcome::Fail("NSFW content detected".into()), None).await;

    let response = post_prompt(&base, "a red cube").await;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body.get("error").unwrap(), "Failed to generate image");
    assert!(body
        .get("details")
        .unwrap()
        .as_str()
        .unwrap()
        .contains("NSFW content detected"));
    assert!(body.get("imageUrl").is_none());
}

#[tokio::test]
async fn timeout_maps_to_gateway_timeout() {
    let base = spawn_app(Outcome::TimeOut, None).await;

    let response = post_prompt(&base, "a red cube").await;
    assert_eq!(response.status(), 504);

    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Failed to generate image");
}

#[tokio::test]
async fn configured_store_persists_the_image() {
    const PNG_BYTES: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0, 9, 9, 9, 9,
    ];

    let image_host = MockServer::start_async().await;
    image_host
        .mock_async(|when, then| {
            when.method(GET).path("/img123.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::new(dir.path()).unwrap();
    let base = spawn_app(
        Outcome::Succeed(image_host.url("/img123.png")),
        Some(store),
    )
    .await;

    let response = post_prompt(&base, "a red cube").await;
    assert_eq!(response.status(), 200);

    let body: GenerateResponse = response.json().await.unwrap();
    assert!(body.success);
    let path = std::path::PathBuf::from(body.image_path.expect("imagePath should be set"));
    assert!(path.starts_with(dir.path()));
    assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn persistence_failure_fails_the_request() {
    let image_host = MockServer::start_async().await;
    image_host
        .mock_async(|when, then| {
            when.method(GET).path("/img123.png");
            then.status(404);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::new(dir.path()).unwrap();
    let base = spawn_app(
        Outcome::Succeed(image_host.url("/img123.png")),
        Some(store),
    )
    .await;

    let response = post_prompt(&base, "a red cube").await;
    assert_eq!(response.status(), 500);

    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Failed to generate image");
    assert!(body.details.unwrap().contains("404"));
}
