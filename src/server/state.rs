//! Shared state for the HTTP layer.

use crate::image::ImageProvider;
use crate::storage::ImageStore;
use std::sync::Arc;

/// State shared across request handlers.
pub struct AppState {
    /// The generation client behind the endpoint.
    pub provider: Arc<dyn ImageProvider>,
    /// Persists results locally when configured.
    pub store: Option<ImageStore>,
}

impl AppState {
    /// Creates the state from an injected provider and optional store.
    pub fn new(provider: Arc<dyn ImageProvider>, store: Option<ImageStore>) -> Self {
        Self { provider, store }
    }
}
