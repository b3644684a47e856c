//! Route handlers for the generation API.

use crate::error::GlassError;
use crate::image::GenerationRequest;
use crate::server::schemas::{ErrorResponse, GenerateRequest, GenerateResponse};
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

/// Routes served under the application root.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/generate", post(generate))
}

/// `POST /api/generate`: run one generation, optionally persist the result.
///
/// The prompt arrives as-is; presence is enforced by the interface, and the
/// provider validates everything else. A persistence failure fails the whole
/// request, so `imagePath` is never silently absent on a configured server.
async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    tracing::info!(prompt = %request.prompt, "received generation request");

    let generation = GenerationRequest::new(&request.prompt);
    let result = match state.provider.generate(&generation).await {
        Ok(result) => result,
        Err(err) => return error_response(err),
    };

    let result = match &state.store {
        Some(store) => match store.save(&result.image_url).await {
            Ok(path) => result.with_path(path),
            Err(err) => return error_response(err),
        },
        None => result,
    };

    tracing::info!(image_url = %result.image_url, "generation complete");
    (
        StatusCode::OK,
        Json(GenerateResponse {
            success: true,
            image_url: result.image_url,
            image_path: result.image_path.map(|path| path.display().to_string()),
        }),
    )
        .into_response()
}

/// Normalizes a client error into the HTTP error shape. Nothing propagates
/// past this boundary as an unhandled fault.
fn error_response(err: GlassError) -> Response {
    let status = match err {
        GlassError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::error!(error = %err, "generation request failed");
    (
        status,
        Json(ErrorResponse {
            error: "Failed to generate image".into(),
            details: Some(err.to_string()),
        }),
    )
        .into_response()
}
