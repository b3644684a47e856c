//! Replicate image generation provider.

use crate::error::{sanitize_error_message, GlassError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GenerationRequest, GenerationResult, JobStatus, Scheduler};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Replicate model variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplicateModel {
    /// Stability AI SDXL, pinned to the version the service was built
    /// against (default).
    #[default]
    Sdxl,
    /// Custom model by id, either `owner/name` or `owner/name:version`.
    Custom(String),
}

impl ReplicateModel {
    /// Returns the model identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sdxl => {
                "stability-ai/sdxl:39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b"
            }
            Self::Custom(id) => id,
        }
    }
}

/// Builder for [`ReplicateProvider`].
#[derive(Debug, Clone)]
pub struct ReplicateProviderBuilder {
    api_token: Option<String>,
    model: ReplicateModel,
    base_url: Option<String>,
    poll_interval: Duration,
    timeout: Duration,
    max_polls: u32,
}

impl Default for ReplicateProviderBuilder {
    fn default() -> Self {
        Self {
            api_token: None,
            model: ReplicateModel::default(),
            base_url: None,
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
            max_polls: 120,
        }
    }
}

impl ReplicateProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token. Falls back to `REPLICATE_API_TOKEN` env var.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the model variant.
    pub fn model(mut self, model: ReplicateModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL. Falls back to `REPLICATE_API_BASE`, then
    /// the public endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the polling interval between status fetches.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum wall-clock time to wait for a prediction.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of status fetches per prediction.
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Builds the provider, resolving credentials.
    pub fn build(self) -> Result<ReplicateProvider> {
        let api_token = self
            .api_token
            .or_else(|| std::env::var("REPLICATE_API_TOKEN").ok())
            .ok_or_else(|| {
                GlassError::Auth("REPLICATE_API_TOKEN not set and no API token provided".into())
            })?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var("REPLICATE_API_BASE").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ReplicateProvider {
            client: reqwest::Client::new(),
            api_token,
            model: self.model,
            base_url,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            max_polls: self.max_polls,
        })
    }
}

/// Replicate image generation provider.
///
/// Submits a prediction to the Replicate API and polls it until it reaches a
/// terminal status. Polling is bounded by both a wall-clock deadline and a
/// maximum fetch count; exceeding either yields [`GlassError::Timeout`].
pub struct ReplicateProvider {
    client: reqwest::Client,
    api_token: String,
    model: ReplicateModel,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
    max_polls: u32,
}

impl ReplicateProvider {
    /// Creates a new [`ReplicateProviderBuilder`].
    pub fn builder() -> ReplicateProviderBuilder {
        ReplicateProviderBuilder::new()
    }

    fn parse_error(&self, status: u16, text: &str) -> GlassError {
        let text = sanitize_error_message(text);
        let message = serde_json::from_str::<ReplicateErrorResponse>(&text)
            .map(|resp| sanitize_error_message(&resp.detail))
            .unwrap_or(text);

        match status {
            401 | 403 => GlassError::Auth(message),
            429 => GlassError::RateLimited,
            _ => GlassError::Api { status, message },
        }
    }

    /// Submit a prediction and return the provider's initial view of it.
    async fn submit(&self, request: &GenerationRequest) -> Result<Prediction> {
        let url = format!("{}/predictions", self.base_url);
        let body = PredictionRequest::from_request(&self.model, request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }

    /// Poll the prediction until it reaches a terminal status.
    ///
    /// Every status fetch counts against `max_polls` and the wall clock is
    /// checked against `timeout` before each sleep, so a prediction that is
    /// non-terminal for N fetches and terminal on fetch N+1 costs exactly
    /// N+1 fetches.
    async fn poll_until_terminal(&self, prediction: Prediction) -> Result<Prediction> {
        if prediction.status.is_terminal() {
            return Ok(prediction);
        }

        let poll_url = prediction.poll_url(&self.base_url);
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            let response = self
                .client
                .get(&poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(self.parse_error(status.as_u16(), &text));
            }

            let prediction: Prediction = response.json().await?;
            polls += 1;

            if prediction.status.is_terminal() {
                return Ok(prediction);
            }

            tracing::debug!(
                id = %prediction.id,
                status = ?prediction.status,
                polls,
                elapsed_secs = start.elapsed().as_secs(),
                "polling prediction"
            );

            if polls >= self.max_polls || start.elapsed() >= self.timeout {
                return Err(GlassError::Timeout(start.elapsed()));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Turn a terminal prediction into a result or a typed failure.
    fn classify(prediction: Prediction) -> Result<GenerationResult> {
        match prediction.status {
            JobStatus::Succeeded => {
                let url = prediction.first_output_url().ok_or(GlassError::EmptyOutput)?;
                Ok(GenerationResult::new(url))
            }
            JobStatus::Failed | JobStatus::Canceled => Err(GlassError::GenerationFailed(
                prediction
                    .error_message()
                    .unwrap_or_else(|| "provider reported failure".into()),
            )),
            JobStatus::Starting | JobStatus::Processing => Err(GlassError::GenerationFailed(
                "prediction did not reach a terminal status".into(),
            )),
        }
    }

    /// Download the image bytes at the given URL.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            if response.status().as_u16() == 403 || response.status().as_u16() == 410 {
                return Err(GlassError::UrlExpired);
            }
            return Err(GlassError::Api {
                status: response.status().as_u16(),
                message: "failed to download image".into(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageProvider for ReplicateProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let submitted = self.submit(request).await?;
        tracing::debug!(id = %submitted.id, "submitted prediction");

        let terminal = self.poll_until_terminal(submitted).await?;
        tracing::debug!(id = %terminal.id, status = ?terminal.status, "prediction finished");

        Self::classify(terminal)
    }

    fn name(&self) -> &str {
        "Replicate"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/account", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(GlassError::Auth("invalid API token".into())),
            _ => Ok(()),
        }
    }
}

// -- Request types --

#[derive(Debug, Serialize)]
struct PredictionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    negative_prompt: String,
    num_outputs: u32,
    scheduler: Scheduler,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_inference_steps: Option<u32>,
}

impl PredictionRequest {
    /// A pinned `owner/name:version` id submits by version hash; a bare
    /// model name goes through the `model` field.
    fn from_request(model: &ReplicateModel, req: &GenerationRequest) -> Self {
        let id = model.as_str();
        let (model_field, version) = match id.split_once(':') {
            Some((_, version)) => (None, Some(version.to_string())),
            None => (Some(id.to_string()), None),
        };

        Self {
            version,
            model: model_field,
            input: PredictionInput {
                prompt: req.prompt.clone(),
                negative_prompt: req.negative_prompt.clone(),
                num_outputs: req.num_outputs,
                scheduler: req.scheduler,
                num_inference_steps: req.num_inference_steps,
            },
        }
    }
}

// -- Response types --

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: JobStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

impl Prediction {
    /// Provider-supplied poll URL, with a constructed fallback.
    fn poll_url(&self, base_url: &str) -> String {
        self.urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", base_url, self.id))
    }

    /// First output URL. The provider returns either a bare string or an
    /// ordered array of URLs depending on the model's output schema.
    fn first_output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) if !url.is_empty() => Some(url.clone()),
            Value::Array(values) => values.iter().find_map(|value| match value {
                Value::String(url) if !url.is_empty() => Some(url.clone()),
                _ => None,
            }),
            _ => None,
        }
    }

    fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(message) => Some(message.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplicateErrorResponse {
    detail: String,
}
