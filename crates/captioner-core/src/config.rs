//! Configuration loaded from the environment.
//!
//! Everything the model backends need (token, model ids, endpoint) lives in
//! an explicitly constructed [`ModelConfig`] that is handed to the backend
//! factory. Nothing here is process-global.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_CAPTION_MODEL: &str = "nlpconnect/vit-gpt2-image-captioning";
pub const DEFAULT_GENERATION_MODEL: &str = "MBZUAI/LaMini-Flan-T5-248M";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
/// 20 MiB, same ceiling as the in-memory upload limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

static HF_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^hf_[A-Za-z0-9]+$").unwrap());

/// Which model backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hugging Face inference API over HTTP.
    Hf,
    /// Canned outputs, no network. Useful for local UI work.
    Stub,
}

impl BackendKind {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => Ok(BackendKind::Hf),
            "stub" => Ok(BackendKind::Stub),
            other => Err(Error::Config(format!("unknown CAPTIONER_BACKEND: {}", other))),
        }
    }
}

/// Model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub backend: BackendKind,
    /// Image-to-text model id.
    pub caption_model: String,
    /// Text-to-text model id used for paraphrase and emoji suggestions.
    pub generation_model: String,
    /// Base URL; the model id is appended as a path segment.
    pub inference_url: String,
    /// Access token. Skipped when serializing.
    #[serde(skip)]
    pub hf_token: Option<String>,
}

impl ModelConfig {
    pub fn has_token(&self) -> bool {
        self.hf_token.is_some()
    }
}

/// Top-level Captioner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionerConfig {
    /// HTTP server port.
    pub port: u16,
    /// Frontend origin allowed by CORS.
    pub frontend_origin: String,
    /// Public base URL of this server, without a trailing slash.
    pub base_url: String,
    /// Upload size ceiling for `/api/caption`.
    pub max_upload_bytes: usize,
    pub models: ModelConfig,
}

impl CaptionerConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {}", p)))?,
            None => DEFAULT_PORT,
        };

        let frontend_origin = var("ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let backend = match var("CAPTIONER_BACKEND") {
            Some(raw) => BackendKind::parse(&raw)?,
            None => BackendKind::Hf,
        };

        let raw_token = var("HF_TOKEN").or_else(|| var("HUGGING_FACE_HUB_TOKEN"));
        let hf_token = match raw_token {
            Some(t) if HF_TOKEN_RE.is_match(t.trim()) => Some(t.trim().to_string()),
            Some(_) => {
                warn!("Ignoring malformed HF token (expected hf_ prefix)");
                None
            }
            None => None,
        };

        let models = ModelConfig {
            backend,
            caption_model: var("BLIP_MODEL_ID").unwrap_or_else(|| DEFAULT_CAPTION_MODEL.into()),
            generation_model: var("GEN_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.into()),
            inference_url: var("HF_INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_URL.into())
                .trim_end_matches('/')
                .to_string(),
            hf_token,
        };

        Ok(Self {
            port,
            frontend_origin,
            base_url,
            max_upload_bytes,
            models,
        })
    }
}
