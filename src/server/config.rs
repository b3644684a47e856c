//! Server configuration loaded from the environment.

use crate::error::{GlassError, Result};
use std::env;
use std::path::PathBuf;

/// Configuration for the generation server.
///
/// The provider token is resolved here once and injected into the client at
/// construction; nothing else reads the environment at request time.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Provider API token.
    pub api_token: String,
    /// Directory generated images are persisted into, when set.
    pub output_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Loads configuration from `.env` (if present) and the process
    /// environment.
    ///
    /// `PORT` defaults to 3000, `REPLICATE_API_TOKEN` is required, and
    /// `OUTPUT_DIR` enables local persistence of generated images.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| GlassError::Config(format!("PORT must be a number, got {raw:?}")))?,
            Err(_) => 3000,
        };

        let api_token = env::var("REPLICATE_API_TOKEN")
            .map_err(|_| GlassError::Config("REPLICATE_API_TOKEN is not set".into()))?;

        let output_dir = env::var("OUTPUT_DIR").ok().map(PathBuf::from);

        Ok(Self {
            port,
            api_token,
            output_dir,
        })
    }
}
