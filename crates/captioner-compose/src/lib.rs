//! Captioner Compose — deterministic caption composition.
//!
//! Three pure pieces: the quality gate that rejects unusable model output,
//! the emoji extractor that cleans up emoji suggestions, and the composer
//! that places hashtags, mentions, location and emoji around a core
//! description.

pub mod compose;
pub mod emoji;
pub mod quality;
pub mod types;

pub use compose::{build_segments, ensure_voice, rule_based_caption, tagify, trim_to_length};
pub use emoji::extract_emojis_only;
pub use quality::looks_bad;
pub use types::{CaptionLength, CaptionOptions, Placement, Segment, Voice};
