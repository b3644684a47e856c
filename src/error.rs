//! Error types for image generation.

use std::time::Duration;

/// Errors that can occur while generating or persisting an image.
#[derive(Debug, thiserror::Error)]
pub enum GlassError {
    /// API token missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Provider rejected the request or returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Error message extracted from the provider response.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider reported a terminal failure for the prediction.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Provider reported success but returned no output URL.
    #[error("generation succeeded but returned no output")]
    EmptyOutput,

    /// Polling exceeded the configured deadline or attempt budget.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Download URL expired before the image could be fetched.
    #[error("download URL expired")]
    UrlExpired,

    /// Fetching or writing the image bytes failed after a successful generation.
    #[error("failed to persist image: {0}")]
    Persistence(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., writing a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GlassError>;

/// Trims an error body down to something loggable. Provider error pages can
/// be arbitrarily large HTML blobs.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    const MAX_LEN: usize = 512;

    let trimmed = text.trim();
    if trimmed.len() <= MAX_LEN {
        return trimmed.to_string();
    }

    let mut end = MAX_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
