//! Caption routes.
//! POST /api/caption runs the pipeline on an uploaded image.

use std::io::Write;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use captioner_compose::Placement;
use captioner_core::Error;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::form::{CaptionForm, UploadedImage, FILE_FIELD};
use crate::pipeline::{run_caption_pipeline, CaptionOutcome, CaptionRequest, CaptionSource};
use crate::state::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/caption", post(create_caption))
        .route("/caption/status", get(get_status))
}

/// Response body of POST /api/caption.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionResponse {
    /// Base caption from the image model.
    pub caption: String,
    pub enhanced: String,
    pub meta: CaptionMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptionMeta {
    pub image_caption_model: String,
    pub text_gen_model: String,
    pub prompt: String,
    pub source: CaptionSource,
    pub used_keywords: Vec<String>,
    pub used_hashtags: Vec<String>,
    pub used_emojis: Vec<String>,
    pub placements: Placements,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placements {
    pub hashtags_placement: Placement,
    pub mentions_placement: Placement,
    pub emoji_placement: Placement,
}

impl CaptionResponse {
    pub fn new(outcome: CaptionOutcome, request: &CaptionRequest) -> Self {
        let options = &request.options;
        let used_hashtags = if options.include_hashtags {
            options.hashtags.clone()
        } else {
            Vec::new()
        };
        let used_emojis = if options.include_emojis {
            outcome.emojis
        } else {
            Vec::new()
        };

        Self {
            caption: outcome.base_caption,
            enhanced: outcome.enhanced,
            meta: CaptionMeta {
                image_caption_model: outcome.image_caption_model,
                text_gen_model: outcome.text_gen_model,
                prompt: outcome.prompt,
                source: outcome.source,
                used_keywords: options.keywords.clone(),
                used_hashtags,
                used_emojis,
                placements: Placements {
                    hashtags_placement: options.hashtags_placement,
                    mentions_placement: options.mentions_placement,
                    emoji_placement: options.emoji_placement,
                },
            },
        }
    }
}

/// POST /api/caption — multipart image plus caption preferences.
async fn create_caption(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CaptionResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("caption", %request_id);

    async move {
        let form = CaptionForm::read(multipart)
            .await
            .map_err(|(status, message)| api_error(status, message))?;

        let Some(image) = form.file.as_ref() else {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("No image uploaded (field '{}').", FILE_FIELD),
            ));
        };

        let request = form.to_request();
        debug!("Caption options: {:?}", request.options);

        let tmp = write_temp_image(image).map_err(|e| {
            error!("Failed to stage upload: {}", e);
            state.record_failure();
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

        let result = run_caption_pipeline(&state.backends, tmp.path(), &request).await;

        if let Err(e) = tmp.close() {
            warn!("Failed to remove temp image: {}", e);
        }

        match result {
            Ok(outcome) => {
                state.record_success(outcome.source);
                Ok(Json(CaptionResponse::new(outcome, &request)))
            }
            Err(e) => {
                error!("Caption pipeline failed: {}", e);
                state.record_failure();
                Err(api_error(status_for(&e), e.to_string()))
            }
        }
    }
    .instrument(span)
    .await
}

/// GET /api/caption/status — configured models and running totals.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models = &state.config.models;
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();
    let stats = state.stats.read().clone();

    Json(serde_json::json!({
        "backend": models.backend,
        "imageCaptionModel": state.backends.captioner.model_id(),
        "textGenModel": state.backends.generator.model_id(),
        "hfTokenConfigured": models.has_token(),
        "uptimeSeconds": uptime,
        "stats": stats,
    }))
}

/// Stage the upload where the image model can read it. Removed on drop.
fn write_temp_image(image: &UploadedImage) -> std::io::Result<NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix("cap-")
        .suffix(&image.extension())
        .tempfile()?;
    tmp.write_all(&image.bytes)?;
    tmp.flush()?;
    Ok(tmp)
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Inference(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use captioner_compose::CaptionOptions;

    fn outcome() -> CaptionOutcome {
        CaptionOutcome {
            base_caption: "A warm sunset over the beach.".into(),
            enhanced: "Chill vibes at the beach 🏖️ 🌅 #beachlife".into(),
            prompt: "Paraphrase ...".into(),
            source: CaptionSource::Model,
            emojis: vec!["🏖️".into(), "🌅".into()],
            image_caption_model: "IMG-1".into(),
            text_gen_model: "TXT-1".into(),
        }
    }

    #[test]
    fn test_response_shape() {
        let request = CaptionRequest {
            options: CaptionOptions {
                keywords: vec!["sunset".into()],
                hashtags: vec!["beachlife".into()],
                include_emojis: true,
                mentions_placement: Placement::Middle,
                ..CaptionOptions::default()
            },
            emoji_count: 2,
        };
        let json = serde_json::to_value(CaptionResponse::new(outcome(), &request)).unwrap();

        assert_eq!(json["caption"], "A warm sunset over the beach.");
        assert_eq!(json["meta"]["source"], "model");
        assert_eq!(json["meta"]["used_keywords"], serde_json::json!(["sunset"]));
        assert_eq!(json["meta"]["used_hashtags"], serde_json::json!(["beachlife"]));
        assert_eq!(json["meta"]["used_emojis"], serde_json::json!(["🏖️", "🌅"]));
        assert_eq!(
            json["meta"]["placements"],
            serde_json::json!({
                "hashtagsPlacement": "end",
                "mentionsPlacement": "middle",
                "emojiPlacement": "end",
            })
        );
    }

    #[test]
    fn test_disabled_segments_report_empty() {
        let request = CaptionRequest {
            options: CaptionOptions {
                hashtags: vec!["beachlife".into()],
                include_hashtags: false,
                include_emojis: false,
                ..CaptionOptions::default()
            },
            emoji_count: 2,
        };
        let response = CaptionResponse::new(outcome(), &request);
        assert!(response.meta.used_hashtags.is_empty());
        assert!(response.meta.used_emojis.is_empty());
    }

    #[test]
    fn test_status_for_errors() {
        assert_eq!(status_for(&Error::Inference("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&Error::Internal("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_temp_image_removed_on_close() {
        let image = UploadedImage {
            bytes: b"img".to_vec(),
            filename: Some("pic.PNG".into()),
        };
        let tmp = write_temp_image(&image).unwrap();
        let path = tmp.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cap-"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"img");
        tmp.close().unwrap();
        assert!(!path.exists());
    }
}
