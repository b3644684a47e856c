//! Local persistence of generated images.

use crate::error::{GlassError, Result};
use crate::image::ImageFormat;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Writes generated images into a local directory with timestamped names.
///
/// Every failure in here is a [`GlassError::Persistence`], distinct from
/// generation failures: by the time the store runs, the provider has already
/// produced a valid image URL.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    client: reqwest::Client,
}

impl ImageStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|err| {
            GlassError::Persistence(format!("failed to create {}: {err}", root.display()))
        })?;

        Ok(Self {
            root,
            client: reqwest::Client::new(),
        })
    }

    /// Returns the directory images are written into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetches the image at `url` and writes it under the store root.
    ///
    /// The filename is `glass-ai-{unix_millis}.{ext}` with the extension
    /// detected from the image bytes (PNG fallback, matching what the model
    /// serves).
    pub async fn save(&self, url: &str) -> Result<PathBuf> {
        let bytes = self.fetch(url).await?;

        let ext = ImageFormat::from_magic_bytes(&bytes)
            .unwrap_or(ImageFormat::Png)
            .extension();
        let filename = format!("glass-ai-{}.{}", Utc::now().timestamp_millis(), ext);
        let path = self.root.join(filename);

        std::fs::write(&path, &bytes).map_err(|err| {
            GlassError::Persistence(format!("failed to write {}: {err}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "persisted image");
        Ok(path)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GlassError::Persistence(format!("failed to fetch {url}: {err}")))?;

        if !response.status().is_success() {
            return Err(GlassError::Persistence(format!(
                "fetching {url} returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| GlassError::Persistence(format!("failed to read image bytes: {err}")))?;

        Ok(bytes.to_vec())
    }
}
