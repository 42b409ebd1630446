//! Caption option types.
//!
//! Placement, voice and length arrive over the wire as loose strings. Each
//! has a `parse_or` that falls back to a default, so an unrecognized value
//! never reaches the composer.

use serde::{Deserialize, Serialize};

/// Where a segment is spliced into the caption's word list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Beginning,
    Middle,
    #[default]
    End,
}

impl Placement {
    /// Slot processing order used by the composer.
    pub const ORDER: [Placement; 3] = [Placement::Beginning, Placement::Middle, Placement::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Beginning => "beginning",
            Placement::Middle => "middle",
            Placement::End => "end",
        }
    }

    /// Parse case-insensitively, falling back to `default`.
    pub fn parse_or(raw: &str, default: Placement) -> Placement {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginning" => Placement::Beginning,
            "middle" => Placement::Middle,
            "end" => Placement::End,
            _ => default,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First-person voice injected into the caption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    I,
    We,
    #[default]
    Neutral,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::I => "i",
            Voice::We => "we",
            Voice::Neutral => "neutral",
        }
    }

    pub fn parse_or(raw: &str, default: Voice) -> Voice {
        match raw.trim().to_ascii_lowercase().as_str() {
            "i" => Voice::I,
            "we" => Voice::We,
            "neutral" => Voice::Neutral,
            _ => default,
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caption length preference, expressed as a word ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl CaptionLength {
    /// Word cap shared by `trim_to_length` and the composer.
    pub fn max_words(&self) -> usize {
        match self {
            CaptionLength::Short => 12,
            CaptionLength::Medium => 25,
            CaptionLength::Long => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionLength::Short => "short",
            CaptionLength::Medium => "medium",
            CaptionLength::Long => "long",
        }
    }

    pub fn parse_or(raw: &str, default: CaptionLength) -> CaptionLength {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => CaptionLength::Short,
            "medium" => CaptionLength::Medium,
            "long" => CaptionLength::Long,
            _ => default,
        }
    }
}

impl std::fmt::Display for CaptionLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences for one caption.
///
/// `tone` and `keywords` only shape the upstream generation prompt; the
/// composer ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionOptions {
    pub tone: String,
    pub keywords: Vec<String>,
    pub hashtags: Vec<String>,
    pub include_hashtags: bool,
    pub include_mentions: bool,
    pub include_emojis: bool,
    /// Location renders independently of `include_mentions`.
    pub include_location: bool,
    pub location: Option<String>,
    pub handles: Vec<String>,
    pub voice: Voice,
    pub length: CaptionLength,
    pub emojis: Vec<String>,
    pub emoji_placement: Placement,
    pub hashtags_placement: Placement,
    pub mentions_placement: Placement,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            tone: "casual".into(),
            keywords: Vec::new(),
            hashtags: Vec::new(),
            include_hashtags: true,
            include_mentions: false,
            include_emojis: false,
            include_location: true,
            location: None,
            handles: Vec::new(),
            voice: Voice::Neutral,
            length: CaptionLength::Medium,
            emojis: Vec::new(),
            emoji_placement: Placement::End,
            hashtags_placement: Placement::End,
            mentions_placement: Placement::End,
        }
    }
}

/// A block of text bound for one placement slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub placement: Placement,
    pub content: String,
}
