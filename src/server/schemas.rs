//! Wire schemas for the HTTP boundary.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    /// The text prompt to generate from.
    pub prompt: String,
}

/// Successful generation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Remote URL of the generated image.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// Local path of the persisted copy, present when the server is
    /// configured with an output directory.
    #[serde(rename = "imagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Error response body, paired with a non-2xx status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Stable, user-facing failure message.
    pub error: String,
    /// Underlying error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
