//! Hugging Face inference API backends.
//!
//! One HTTP client shared by an image captioner and a text generator. Each
//! request is `POST {inference_url}/{model_id}` with a JSON body; the
//! response is either `[{"generated_text": ...}]` or a bare object.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use captioner_core::{Error, ModelConfig, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::{GenerationParams, ImageCaptioner, TextGenerator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared HTTP client for the inference endpoint.
#[derive(Clone)]
pub struct HfClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HfClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.inference_url.trim_end_matches('/').to_string(),
            token: config.hf_token.clone(),
        })
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{}/{}", self.base_url, model_id)
    }

    async fn infer(&self, model_id: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(model_id);
        debug!("Inference request to {}", url);

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("API error {}: {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Inference(format!("Invalid response body: {}", e)))
    }
}

/// Pull the generated text out of an inference response.
///
/// Accepts an array (first element is used) or a single object, and either a
/// `generated_text` or a `text` field.
pub fn extract_generated_text(value: &Value) -> Option<String> {
    let first = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    first
        .get("generated_text")
        .or_else(|| first.get("text"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

fn text_body(prompt: &str, params: &GenerationParams) -> Value {
    json!({
        "inputs": prompt,
        "parameters": params,
        "options": { "wait_for_model": true },
    })
}

fn image_body(image: &[u8], params: &GenerationParams) -> Value {
    json!({
        "inputs": general_purpose::STANDARD.encode(image),
        "parameters": params,
        "options": { "wait_for_model": true },
    })
}

/// Image-to-text model served by the inference API.
pub struct HfImageCaptioner {
    client: HfClient,
    model_id: String,
}

impl HfImageCaptioner {
    pub fn new(client: HfClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl ImageCaptioner for HfImageCaptioner {
    async fn caption(&self, image: &Path, params: &GenerationParams) -> Result<String> {
        let bytes = tokio::fs::read(image).await?;
        let response = self
            .client
            .infer(&self.model_id, &image_body(&bytes, params))
            .await?;
        extract_generated_text(&response)
            .ok_or_else(|| Error::Inference("Caption response had no generated_text".into()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Text-to-text model served by the inference API.
pub struct HfTextGenerator {
    client: HfClient,
    model_id: String,
}

impl HfTextGenerator {
    pub fn new(client: HfClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HfTextGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let response = self
            .client
            .infer(&self.model_id, &text_body(prompt, params))
            .await?;
        extract_generated_text(&response)
            .ok_or_else(|| Error::Inference("Generation response had no generated_text".into()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
