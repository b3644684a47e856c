#![warn(missing_docs)]
//! Glass AI - prompt-to-image generation over a hosted diffusion model.
//!
//! The crate wraps [Replicate](https://replicate.com)'s prediction API behind
//! a typed client and exposes it two ways: as a library, and as a small HTTP
//! service (`POST /api/generate`) suitable for fronting with a web page.
//!
//! # Quick Start
//!
//! ```no_run
//! use glass_ai::{GenerationRequest, ImageProvider, ReplicateProvider};
//!
//! #[tokio::main]
//! async fn main() -> glass_ai::Result<()> {
//!     let provider = ReplicateProvider::builder().build()?;
//!     let request = GenerationRequest::new("a red cube on a white background");
//!     let result = provider.generate(&request).await?;
//!     println!("{}", result.image_url);
//!     Ok(())
//! }
//! ```
//!
//! # Server
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> glass_ai::Result<()> {
//!     let config = glass_ai::ServerConfig::load()?;
//!     glass_ai::server::serve(config).await
//! }
//! ```

pub mod error;
pub mod image;
pub mod server;
pub mod storage;

pub use error::{GlassError, Result};
pub use image::providers::{ReplicateModel, ReplicateProvider, ReplicateProviderBuilder};
pub use image::{
    GenerationRequest, GenerationResult, ImageFormat, ImageProvider, JobStatus, Scheduler,
};
pub use server::ServerConfig;
pub use storage::ImageStore;
