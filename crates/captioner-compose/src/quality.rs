//! Quality gate for generated captions.
//!
//! Decides whether a paraphrase from the text model is usable or whether
//! the pipeline should fall back to the base caption.

/// Fragments seen when the model answers with meta-instructions instead of
/// a caption.
pub const BAD_HINTS: &[&str] = &[
    "text editor",
    "article",
    "there is no other way",
    "first two lines",
];

/// Minimum candidate length, in characters.
const MIN_CHARS: usize = 3;

/// Returns true when `candidate` should be rejected.
///
/// Rejects empty or very short text, text that echoes the prompt back, and
/// text containing any of [`BAD_HINTS`]. An empty prompt is never treated as
/// an echo.
pub fn looks_bad(candidate: &str, prompt: &str) -> bool {
    if candidate.is_empty() {
        return true;
    }
    if candidate.chars().count() < MIN_CHARS {
        return true;
    }

    let lower = candidate.to_lowercase();
    if !prompt.is_empty() && lower.starts_with(&prompt.to_lowercase()) {
        return true;
    }

    BAD_HINTS.iter().any(|hint| lower.contains(hint))
}
