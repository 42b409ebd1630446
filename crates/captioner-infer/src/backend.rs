//! Model backend traits.
//!
//! The caption pipeline only sees these two traits:
//! - `ImageCaptioner`: image file → short description
//! - `TextGenerator`: prompt → generated text
//!
//! Both may fail or return junk; callers are expected to cope.

use std::path::Path;

use async_trait::async_trait;
use captioner_core::Result;
use serde::Serialize;

/// Sampling parameters sent with a generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
}

impl GenerationParams {
    /// Image description.
    pub fn caption() -> Self {
        Self {
            max_new_tokens: 35,
            temperature: 0.7,
            top_k: Some(50),
            top_p: Some(0.95),
            repetition_penalty: None,
        }
    }

    /// Caption paraphrase.
    pub fn paraphrase() -> Self {
        Self {
            max_new_tokens: 64,
            temperature: 0.8,
            top_k: None,
            top_p: Some(0.95),
            repetition_penalty: Some(1.05),
        }
    }

    /// Emoji suggestions.
    pub fn emoji() -> Self {
        Self {
            max_new_tokens: 16,
            temperature: 0.7,
            top_k: None,
            top_p: Some(0.95),
            repetition_penalty: None,
        }
    }
}

/// Image-to-text model.
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    /// Describe the image stored at `image`.
    async fn caption(&self, image: &Path, params: &GenerationParams) -> Result<String>;

    /// Model identifier reported in response metadata.
    fn model_id(&self) -> &str;
}

/// Text-to-text model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    fn model_id(&self) -> &str;
}
