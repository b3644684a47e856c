//! HTTP boundary for the generation client.

mod config;
mod routes;
mod schemas;
mod state;

pub use config::ServerConfig;
pub use routes::api_routes;
pub use schemas::{ErrorResponse, GenerateRequest, GenerateResponse};
pub use state::AppState;

use crate::error::Result;
use crate::image::providers::ReplicateProvider;
use crate::storage::ImageStore;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builds the application router for the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().merge(api_routes()).with_state(state)
}

/// Runs the HTTP server described by `config` until the process exits.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let provider = ReplicateProvider::builder()
        .api_token(&config.api_token)
        .build()?;

    let store = match &config.output_dir {
        Some(dir) => Some(ImageStore::new(dir)?),
        None => None,
    };

    let state = Arc::new(AppState::new(Arc::new(provider), store));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(port = config.port, "starting generation server");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
