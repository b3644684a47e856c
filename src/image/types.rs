//! Core types for image generation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Negative prompt applied to every request unless overridden.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "low quality, bad anatomy, worst quality, low resolution";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Diffusion schedulers accepted by the hosted SDXL model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scheduler {
    /// Euler discrete (default).
    #[default]
    #[serde(rename = "K_EULER")]
    KEuler,
    /// Euler ancestral.
    #[serde(rename = "K_EULER_ANCESTRAL")]
    KEulerAncestral,
    /// DDIM.
    #[serde(rename = "DDIM")]
    Ddim,
    /// DPM-Solver multistep.
    #[serde(rename = "DPMSolverMultistep")]
    DpmSolverMultistep,
    /// Heun discrete.
    #[serde(rename = "HeunDiscrete")]
    HeunDiscrete,
    /// DPM with Karras sigmas.
    #[serde(rename = "KarrasDPM")]
    KarrasDpm,
    /// PNDM.
    #[serde(rename = "PNDM")]
    Pndm,
}

impl Scheduler {
    /// Returns the scheduler identifier as the provider spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KEuler => "K_EULER",
            Self::KEulerAncestral => "K_EULER_ANCESTRAL",
            Self::Ddim => "DDIM",
            Self::DpmSolverMultistep => "DPMSolverMultistep",
            Self::HeunDiscrete => "HeunDiscrete",
            Self::KarrasDpm => "KarrasDPM",
            Self::Pndm => "PNDM",
        }
    }
}

impl std::fmt::Display for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prediction lifecycle states reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted by the provider, not yet running.
    Starting,
    /// Generation in progress.
    Processing,
    /// Finished with output available.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Canceled on the provider side.
    Canceled,
}

impl JobStatus {
    /// Returns true if no further status transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// A request to generate an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Features the model should steer away from.
    pub negative_prompt: String,
    /// Number of images to generate.
    pub num_outputs: u32,
    /// Diffusion scheduler to use.
    pub scheduler: Scheduler,
    /// Number of denoising steps; the provider default applies when unset.
    pub num_inference_steps: Option<u32>,
}

impl GenerationRequest {
    /// Creates a request with the given prompt and the service defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            num_outputs: 1,
            scheduler: Scheduler::default(),
            num_inference_steps: Some(50),
        }
    }

    /// Overrides the negative prompt.
    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    /// Sets the number of images to generate.
    pub fn with_num_outputs(mut self, num_outputs: u32) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    /// Sets the diffusion scheduler.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Sets the number of denoising steps.
    pub fn with_num_inference_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = Some(steps);
        self
    }
}

/// The outcome of a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "generation result should be returned or persisted"]
pub struct GenerationResult {
    /// Remote URL of the generated image.
    pub image_url: String,
    /// Local path of the persisted copy, when persistence ran.
    pub image_path: Option<PathBuf>,
}

impl GenerationResult {
    /// Creates a result holding only the remote URL.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            image_path: None,
        }
    }

    /// Attaches the local path of a persisted copy.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}
