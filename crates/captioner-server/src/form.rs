//! `/api/caption` form parsing.
//!
//! Every field is optional and arrives as text. Lists may be JSON arrays or
//! comma-separated strings; enums fall back to their defaults.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::StatusCode;
use captioner_compose::{CaptionLength, CaptionOptions, Placement, Voice};

use crate::pipeline::{clamp_emoji_count, CaptionRequest, DEFAULT_EMOJI_COUNT};

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// The uploaded image.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

impl UploadedImage {
    /// Lowercased extension including the dot, `.jpg` when absent or odd.
    pub fn extension(&self) -> String {
        self.filename
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_else(|| ".jpg".to_string())
    }
}

/// Raw multipart content: the optional file plus every text field.
#[derive(Debug, Default)]
pub struct CaptionForm {
    pub file: Option<UploadedImage>,
    pub fields: HashMap<String, String>,
}

impl CaptionForm {
    /// Drain a multipart body. Errors carry the status axum suggests.
    pub async fn read(mut multipart: Multipart) -> Result<Self, (StatusCode, String)> {
        let mut form = CaptionForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err((e.status(), e.body_text())),
            };

            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (e.status(), e.body_text()))?;
                form.file = Some(UploadedImage {
                    bytes: bytes.to_vec(),
                    filename,
                });
            } else {
                let text = field.text().await.map_err(|e| (e.status(), e.body_text()))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Turn the text fields into pipeline input.
    pub fn to_request(&self) -> CaptionRequest {
        let tone = self
            .get("tone")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("casual")
            .to_string();

        let location = self
            .get("location")
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let placement = |key: &str| Placement::parse_or(self.get(key).unwrap_or(""), Placement::End);

        let options = CaptionOptions {
            tone,
            keywords: parse_list(self.get("keywords"), false),
            hashtags: parse_list(self.get("hashtags"), true),
            include_hashtags: parse_flag(self.get("includeHashtags"), true),
            include_mentions: parse_flag(self.get("includeMentions"), false),
            include_emojis: parse_flag(self.get("includeEmojis"), false),
            include_location: parse_flag(self.get("includeLocation"), true),
            location,
            handles: parse_list(self.get("handles"), true),
            voice: Voice::parse_or(self.get("voice").unwrap_or(""), Voice::Neutral),
            length: CaptionLength::parse_or(self.get("length").unwrap_or(""), CaptionLength::Medium),
            emojis: Vec::new(),
            emoji_placement: placement("emojiPlacement"),
            hashtags_placement: placement("hashtagsPlacement"),
            mentions_placement: placement("mentionsPlacement"),
        };

        CaptionRequest {
            options,
            emoji_count: parse_emoji_count(self.get("emojiCount")),
        }
    }
}

/// Parse a list field.
///
/// A JSON array wins. Anything else is split on commas when
/// `allow_comma` is set and dropped otherwise.
pub fn parse_list(raw: Option<&str>, allow_comma: bool) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };

    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(raw) {
        return items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
    }

    if !allow_comma {
        return Vec::new();
    }

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"true"` is true, any other value is false, absence is `default`.
pub fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(v) => v.trim() == "true",
        None => default,
    }
}

/// Numeric count clamped to `[1, 8]`; missing or non-numeric means 2.
pub fn parse_emoji_count(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(|n| clamp_emoji_count(n.max(0.0) as usize))
        .unwrap_or(DEFAULT_EMOJI_COUNT)
}
