//! Caption pipeline — image model, paraphrase, quality gate, emoji, compose.
//!
//! Only the image model is allowed to fail the request. A failing or
//! low-quality paraphrase falls back to the base caption, and a failing
//! emoji suggestion just means no emoji.

use std::path::Path;

use captioner_compose::{extract_emojis_only, looks_bad, rule_based_caption, CaptionOptions};
use captioner_core::Result;
use captioner_infer::{Backends, GenerationParams};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const DEFAULT_EMOJI_COUNT: usize = 2;
pub const MAX_EMOJI_COUNT: usize = 8;

static TRAILING_DOTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(\s*\.)+$").unwrap());
static SURROUNDING_QUOTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"+|"+$"#).unwrap());
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\s)#\w+").unwrap());

/// Where the enhanced caption's core text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptionSource {
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "rule-based")]
    RuleBased,
}

/// Everything the pipeline needs besides the image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// `emojis` is ignored; emoji come from the generator.
    pub options: CaptionOptions,
    pub emoji_count: usize,
}

/// Pipeline result, before it is shaped into the HTTP response.
#[derive(Debug, Clone)]
pub struct CaptionOutcome {
    pub base_caption: String,
    pub enhanced: String,
    pub prompt: String,
    pub source: CaptionSource,
    pub emojis: Vec<String>,
    pub image_caption_model: String,
    pub text_gen_model: String,
}

/// Paraphrase prompt for the text model.
pub fn build_prompt(base_caption: &str, options: &CaptionOptions) -> String {
    let keywords_line = if options.keywords.is_empty() {
        String::new()
    } else {
        format!(
            "Incorporate these concepts naturally: {}. ",
            options.keywords.join(", ")
        )
    };
    let has_location = options
        .location
        .as_deref()
        .is_some_and(|l| !l.trim().is_empty());
    let location_line = if has_location {
        "If relevant, acknowledge the location naturally (do not add hashtags). "
    } else {
        ""
    };

    format!(
        "Paraphrase into a {} social media caption in the voice of \"{}\". \
         Keep it {}. Do NOT include hashtags. {}{}Description: {}",
        options.tone, options.voice, options.length, keywords_line, location_line, base_caption
    )
}

/// Emoji suggestion prompt for the text model.
pub fn build_emoji_prompt(core: &str, count: usize) -> String {
    format!(
        "Given this caption: \"{}\". Suggest {} relevant emojis only. \
         Return emojis separated by spaces, with no words or punctuation.",
        core, count
    )
}

/// Tidy raw image-model output: single spaces, one trailing period.
pub fn normalize_base_caption(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw.trim());
    TRAILING_DOTS_RE.replace(&collapsed, ".").trim().to_string()
}

/// Tidy a paraphrase: drop wrapping quotes and any hashtags the model added.
pub fn clean_generated(raw: &str) -> String {
    let unquoted = SURROUNDING_QUOTES_RE.replace_all(raw.trim(), "");
    let collapsed = collapse_whitespace(&unquoted);
    let without_tags = HASHTAG_RE.replace_all(&collapsed, "");
    collapse_whitespace(&without_tags)
}

/// Clamp a requested emoji count to `[1, 8]`.
pub fn clamp_emoji_count(count: usize) -> usize {
    count.clamp(1, MAX_EMOJI_COUNT)
}

/// Run the full pipeline for one uploaded image.
pub async fn run_caption_pipeline(
    backends: &Backends,
    image: &Path,
    request: &CaptionRequest,
) -> Result<CaptionOutcome> {
    let options = &request.options;

    let raw_caption = backends
        .captioner
        .caption(image, &GenerationParams::caption())
        .await?;
    let base_caption = normalize_base_caption(&raw_caption);
    info!(
        "Base caption from {}: {:?}",
        backends.captioner.model_id(),
        base_caption
    );

    let prompt = build_prompt(&base_caption, options);
    let (core, source) = match backends
        .generator
        .generate(&prompt, &GenerationParams::paraphrase())
        .await
    {
        Ok(text) => {
            let candidate = clean_generated(&text);
            if looks_bad(&candidate, &prompt) {
                debug!("Paraphrase rejected by quality gate: {:?}", candidate);
                (base_caption.clone(), CaptionSource::RuleBased)
            } else {
                (candidate, CaptionSource::Model)
            }
        }
        Err(e) => {
            warn!("Paraphrase generation failed: {}", e);
            (base_caption.clone(), CaptionSource::RuleBased)
        }
    };

    let emojis = if options.include_emojis {
        let count = clamp_emoji_count(request.emoji_count);
        match backends
            .generator
            .generate(&build_emoji_prompt(&core, count), &GenerationParams::emoji())
            .await
        {
            Ok(raw) => extract_emojis_only(&raw, count),
            Err(e) => {
                warn!("Emoji generation failed: {}", e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let compose_options = CaptionOptions {
        emojis: emojis.clone(),
        ..options.clone()
    };
    let enhanced = rule_based_caption(&core, &compose_options);
    info!("Enhanced caption ({:?}): {:?}", source, enhanced);

    Ok(CaptionOutcome {
        base_caption,
        enhanced,
        prompt,
        source,
        emojis,
        image_caption_model: backends.captioner.model_id().to_string(),
        text_gen_model: backends.generator.model_id().to_string(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
