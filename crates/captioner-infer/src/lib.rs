//! Captioner Infer — image captioning and text generation backends.
//!
//! Provides the `ImageCaptioner` and `TextGenerator` traits. With the `hf`
//! backend both are served by the Hugging Face inference API; with `stub`
//! they return canned text and never touch the network.

pub mod backend;
pub mod hf;
pub mod stub;

pub use backend::{GenerationParams, ImageCaptioner, TextGenerator};
pub use hf::{HfClient, HfImageCaptioner, HfTextGenerator};
pub use stub::{StubCaptioner, StubGenerator};

use std::sync::Arc;

use captioner_core::{BackendKind, ModelConfig, Result};

/// The pair of models the caption pipeline runs against.
#[derive(Clone)]
pub struct Backends {
    pub captioner: Arc<dyn ImageCaptioner>,
    pub generator: Arc<dyn TextGenerator>,
}

/// Build the configured backends.
pub fn create_backends(config: &ModelConfig) -> Result<Backends> {
    match config.backend {
        BackendKind::Hf => {
            let client = HfClient::new(config)?;
            if !config.has_token() {
                tracing::warn!("No HF token configured. Requests may be rate limited.");
            }
            tracing::info!(
                "Using HF inference backends (caption={}, generation={})",
                config.caption_model,
                config.generation_model
            );
            Ok(Backends {
                captioner: Arc::new(HfImageCaptioner::new(
                    client.clone(),
                    config.caption_model.clone(),
                )),
                generator: Arc::new(HfTextGenerator::new(client, config.generation_model.clone())),
            })
        }
        BackendKind::Stub => {
            tracing::info!("Using stub model backends");
            Ok(Backends {
                captioner: Arc::new(StubCaptioner::default()),
                generator: Arc::new(StubGenerator),
            })
        }
    }
}
