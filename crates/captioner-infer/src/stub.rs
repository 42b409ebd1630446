//! Offline backends with canned output.

use std::path::Path;

use async_trait::async_trait;
use captioner_core::Result;

use crate::backend::{GenerationParams, ImageCaptioner, TextGenerator};

pub const STUB_MODEL_ID: &str = "stub";

/// Returns the same description for every image.
pub struct StubCaptioner {
    caption: String,
}

impl StubCaptioner {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
        }
    }
}

impl Default for StubCaptioner {
    fn default() -> Self {
        Self::new("A photo of a pleasant afternoon.")
    }
}

#[async_trait]
impl ImageCaptioner for StubCaptioner {
    async fn caption(&self, _image: &Path, _params: &GenerationParams) -> Result<String> {
        Ok(self.caption.clone())
    }

    fn model_id(&self) -> &str {
        STUB_MODEL_ID
    }
}

/// Echoes the description back for paraphrase prompts and suggests a fixed
/// emoji pair otherwise.
#[derive(Default)]
pub struct StubGenerator;

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        let out = match prompt.rsplit_once("Description: ") {
            Some((_, description)) => description.trim().to_string(),
            None => "✨ 📸".to_string(),
        };
        Ok(out)
    }

    fn model_id(&self) -> &str {
        STUB_MODEL_ID
    }
}
