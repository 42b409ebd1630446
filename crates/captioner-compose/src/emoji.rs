//! Emoji extraction from free-form model output.

use once_cell::sync::Lazy;
use regex::Regex;

/// ASCII letters, digits and the punctuation a model tends to wrap emoji in.
static NON_EMOJI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[A-Za-z0-9,.;:()"'`~_-]"#).unwrap());

/// Extended pictographic plus the emoji and symbol/dingbat blocks that fall
/// outside that property.
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]").unwrap()
});

/// Returns the first `max` emoji-like tokens of `raw`, in order.
///
/// Splitting happens on whitespace, so multi-codepoint emoji (variation
/// selectors, ZWJ sequences) stay whole.
pub fn extract_emojis_only(raw: &str, max: usize) -> Vec<String> {
    if raw.is_empty() || max == 0 {
        return Vec::new();
    }

    let stripped = NON_EMOJI_RE.replace_all(raw, " ");

    stripped
        .split_whitespace()
        .filter(|token| EMOJI_RE.is_match(token))
        .take(max)
        .map(str::to_string)
        .collect()
}
