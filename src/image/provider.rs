//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;

/// Trait for hosted image generation providers.
///
/// This is the seam the HTTP layer is written against, so request handlers
/// can be exercised with a stub provider in tests.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    ///
    /// On success the result carries the remote URL of the first generated
    /// image. Every failure mode (submission rejection, terminal failure,
    /// empty output, timeout) surfaces as a typed error; no retries are
    /// attempted.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks that the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
