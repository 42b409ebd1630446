//! Rule-based caption composition.
//!
//! Turns a core description plus [`CaptionOptions`] into the final caption:
//! strip the leading article, splice the emoji, mentions/location and
//! hashtag segments into the word list, inject the requested voice, cap the
//! word count and tidy punctuation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CaptionLength, CaptionOptions, Placement, Segment, Voice};

/// Hashtags rendered per caption.
pub const MAX_HASHTAGS: usize = 8;

/// Prefix for the location token.
pub const LOCATION_PIN: &str = "📍";

static LEADING_A_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^a\s+").unwrap());
static LEADING_THE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^the\s+").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.!?;:])").unwrap());

static FIRST_SINGULAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(I|I'm|I’m|I've|I’ve|me|my|mine)\b").unwrap());
static FIRST_PLURAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(we|we're|we’re|we've|we’ve|us|our|ours)\b").unwrap());

/// Normalize a word into a hashtag: lowercase, keep `[a-z0-9]`, prefix `#`.
pub fn tagify(word: &str) -> String {
    let body: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    format!("#{}", body)
}

/// Prefix `I`/`We` unless the text already speaks in that voice.
pub fn ensure_voice(text: &str, voice: Voice) -> String {
    let (pronoun, present) = match voice {
        Voice::Neutral => return text.to_string(),
        Voice::I => ("I", FIRST_SINGULAR_RE.is_match(text)),
        Voice::We => ("We", FIRST_PLURAL_RE.is_match(text)),
    };

    if present {
        text.to_string()
    } else {
        format!("{} {}", pronoun, lowercase_first(text))
    }
}

/// Cap `text` at the word ceiling for `length`.
///
/// Text already within the cap is returned unchanged.
pub fn trim_to_length(text: &str, length: CaptionLength) -> String {
    let max_words = length.max_words();
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        words[..max_words].join(" ")
    }
}

/// Build the non-empty segments in their fixed insertion order:
/// emoji, then mentions/location, then hashtags.
pub fn build_segments(options: &CaptionOptions) -> Vec<Segment> {
    let emojis = if options.include_emojis {
        options.emojis.join(" ")
    } else {
        String::new()
    };

    let mut mention_tokens: Vec<String> = Vec::new();
    if options.include_location {
        if let Some(location) = options.location.as_deref().map(str::trim) {
            if !location.is_empty() {
                mention_tokens.push(format!("{}{}", LOCATION_PIN, location));
            }
        }
    }
    if options.include_mentions {
        mention_tokens.extend(options.handles.iter().filter_map(|h| normalize_handle(h)));
    }

    let hashtags: Vec<String> = if options.include_hashtags {
        options
            .hashtags
            .iter()
            .take(MAX_HASHTAGS)
            .map(|h| tagify(h))
            .filter(|t| t.len() > 1)
            .collect()
    } else {
        Vec::new()
    };

    [
        (options.emoji_placement, emojis),
        (options.mentions_placement, mention_tokens.join(" ")),
        (options.hashtags_placement, hashtags.join(" ")),
    ]
    .into_iter()
    .map(|(placement, content)| Segment {
        placement,
        content: content.trim().to_string(),
    })
    .filter(|s| !s.content.is_empty())
    .collect()
}

/// Compose the final caption from `core` and `options`.
pub fn rule_based_caption(core: &str, options: &CaptionOptions) -> String {
    let core = strip_article(core);
    let mut words: Vec<String> = core.split_whitespace().map(str::to_string).collect();

    let segments = build_segments(options);
    for slot in Placement::ORDER {
        for segment in segments.iter().filter(|s| s.placement == slot) {
            place_segment(&mut words, &segment.content, slot);
        }
    }

    let joined = words.join(" ");
    let voiced = ensure_voice(&collapse_whitespace(&joined), options.voice);

    let max_words = options.length.max_words();
    let mut capped: Vec<&str> = voiced.split_whitespace().collect();
    capped.truncate(max_words);

    SPACE_BEFORE_PUNCT_RE
        .replace_all(&capped.join(" "), "$1")
        .trim()
        .to_string()
}

fn strip_article(core: &str) -> String {
    let without_a = LEADING_A_RE.replace(core, "");
    LEADING_THE_RE.replace(&without_a, "").trim().to_string()
}

fn normalize_handle(handle: &str) -> Option<String> {
    let name = handle.trim().trim_start_matches('@');
    if name.is_empty() {
        None
    } else {
        Some(format!("@{}", name))
    }
}

/// Splice `content`'s words into `words` at the slot's index.
///
/// `middle` is computed against the list as it stands now, so earlier
/// insertions shift later midpoints.
fn place_segment(words: &mut Vec<String>, content: &str, placement: Placement) {
    let len = words.len();
    let at = match placement {
        Placement::Beginning => 0,
        Placement::End => len,
        Placement::Middle => (len / 2).max(1).min(len),
    };
    let insert = content.split_whitespace().map(str::to_string);
    words.splice(at..at, insert);
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn river_options() -> CaptionOptions {
        CaptionOptions {
            tone: "casual".into(),
            keywords: vec!["river".into(), "sunny".into()],
            hashtags: vec!["SunnyDay".into(), "Nature".into(), "Walk".into()],
            include_hashtags: true,
            include_mentions: true,
            include_emojis: true,
            include_location: true,
            location: Some("Paris".into()),
            handles: vec!["alice".into(), "@bob".into()],
            voice: Voice::Neutral,
            length: CaptionLength::Medium,
            emojis: vec!["🌞".into(), "🌿".into()],
            emoji_placement: Placement::Beginning,
            hashtags_placement: Placement::End,
            mentions_placement: Placement::Middle,
        }
    }

    const BASE: &str = "A lovely sunny afternoon by the river.";

    fn is_segment_token(word: &str, options: &CaptionOptions) -> bool {
        word.starts_with('#')
            || word.starts_with('@')
            || word.starts_with(LOCATION_PIN)
            || options.emojis.iter().any(|e| e == word)
    }

    #[test]
    fn test_tagify() {
        assert_eq!(tagify("Hello World!!"), "#helloworld");
        assert_eq!(tagify("  C++ / JS "), "#cjs");
        assert_eq!(tagify("###Hash_TAG 123"), "#hashtag123");
        assert_eq!(tagify("Café"), "#caf");
    }

    #[test]
    fn test_tagify_idempotent() {
        for s in ["SunnyDay", "#Nature", "  walk 2 work ", "##a#b"] {
            let once = tagify(s);
            assert_eq!(tagify(&once[1..]), once);
        }
    }

    #[test]
    fn test_ensure_voice() {
        assert_eq!(ensure_voice("Great day at the beach", Voice::I), "I great day at the beach");
        assert_eq!(ensure_voice("Great day at the beach", Voice::We), "We great day at the beach");
        assert_eq!(ensure_voice("I love pizza", Voice::I), "I love pizza");
        assert_eq!(ensure_voice("We are thrilled", Voice::We), "We are thrilled");
        assert_eq!(ensure_voice("Sunset with my dog", Voice::I), "Sunset with my dog");
        assert_eq!(ensure_voice("Dinner with us tonight", Voice::We), "Dinner with us tonight");
        assert_eq!(ensure_voice("I’m home", Voice::I), "I’m home");
        assert_eq!(ensure_voice("we’ve arrived", Voice::We), "we’ve arrived");
    }

    #[test]
    fn test_ensure_voice_neutral_is_identity() {
        for text in ["", "Great day", "I love pizza", "  spaced  "] {
            assert_eq!(ensure_voice(text, Voice::Neutral), text);
        }
    }

    #[test]
    fn test_ensure_voice_whole_words_only() {
        // "mine" inside "minecraft", "us" inside "music"
        assert_eq!(ensure_voice("Minecraft night", Voice::I), "I minecraft night");
        assert_eq!(ensure_voice("Music all night", Voice::We), "We music all night");
    }

    #[test]
    fn test_trim_to_length() {
        let long = "one two three four five six seven eight nine ten eleven twelve thirteen";
        assert_eq!(trim_to_length(long, CaptionLength::Short).split_whitespace().count(), 12);

        let med: Vec<String> = (0..30).map(|i| format!("w{}", i)).collect();
        let med = med.join(" ");
        assert_eq!(trim_to_length(&med, CaptionLength::Medium).split_whitespace().count(), 25);

        let lng: Vec<String> = (0..70).map(|i| format!("w{}", i)).collect();
        let lng = lng.join(" ");
        assert_eq!(trim_to_length(&lng, CaptionLength::Long).split_whitespace().count(), 60);

        assert_eq!(trim_to_length("a  b c", CaptionLength::Short), "a  b c");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let out = rule_based_caption(BASE, &river_options());
        assert!(out.starts_with("🌞 🌿 "), "got: {}", out);
        assert!(out.contains("📍Paris"));
        assert!(out.contains("@alice"));
        assert!(out.contains("@bob"));
        assert!(out.ends_with("#sunnyday #nature #walk"));
        assert!(!SPACE_BEFORE_PUNCT_RE.is_match(&out));
        assert_eq!(
            out,
            "🌞 🌿 lovely sunny 📍Paris @alice @bob afternoon by the river. #sunnyday #nature #walk"
        );
    }

    #[test]
    fn test_article_stripping() {
        let options = CaptionOptions::default();
        assert_eq!(rule_based_caption("A dog on a couch", &options), "dog on a couch");
        assert_eq!(rule_based_caption("THE  cat sleeps", &options), "cat sleeps");
        assert_eq!(rule_based_caption("Another day", &options), "Another day");
        assert_eq!(rule_based_caption("Theater lights", &options), "Theater lights");
    }

    #[test]
    fn test_voice_runs_after_placement() {
        let options = CaptionOptions {
            voice: Voice::I,
            ..river_options()
        };
        let out = rule_based_caption(BASE, &options);
        assert!(out.starts_with("I 🌞 🌿 "), "got: {}", out);
    }

    #[test]
    fn test_length_cap() {
        let long_core = "The very very long description filled with many many words should be \
                         trimmed when length is short to avoid overflow of characters and words \
                         beyond limit";
        for length in [CaptionLength::Short, CaptionLength::Medium, CaptionLength::Long] {
            for voice in [Voice::I, Voice::We, Voice::Neutral] {
                let options = CaptionOptions {
                    length,
                    voice,
                    ..river_options()
                };
                let out = rule_based_caption(long_core, &options);
                assert!(out.split_whitespace().count() <= length.max_words());
            }
        }
    }

    #[test]
    fn test_cap_can_cut_end_segment() {
        let options = CaptionOptions {
            length: CaptionLength::Short,
            ..river_options()
        };
        let core = "one two three four five six seven eight nine ten";
        let out = rule_based_caption(core, &options);
        assert_eq!(out.split_whitespace().count(), 12);
        assert!(!out.contains("#walk"));
    }

    #[test]
    fn test_toggles_off() {
        let options = CaptionOptions {
            include_hashtags: false,
            include_mentions: false,
            include_emojis: false,
            ..river_options()
        };
        let out = rule_based_caption(BASE, &options);
        assert!(!out.contains('#'));
        assert!(!out.contains('@'));
        assert!(!out.contains("🌞"));
        assert!(!out.contains("🌿"));
    }

    #[test]
    fn test_location_independent_of_mentions() {
        let options = CaptionOptions {
            include_mentions: false,
            ..river_options()
        };
        let out = rule_based_caption(BASE, &options);
        assert!(out.contains("📍Paris"));
        assert!(!out.contains('@'));

        let options = CaptionOptions {
            include_location: false,
            ..river_options()
        };
        let out = rule_based_caption(BASE, &options);
        assert!(!out.contains(LOCATION_PIN));
        assert!(out.contains("@alice"));
    }

    #[test]
    fn test_middle_never_at_boundaries() {
        let options = CaptionOptions {
            emoji_placement: Placement::Middle,
            hashtags_placement: Placement::Middle,
            mentions_placement: Placement::Middle,
            ..river_options()
        };
        let out = rule_based_caption("Lovely river walk today", &options);
        let words: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(words.first(), Some(&"Lovely"));
        assert_eq!(words.last(), Some(&"today"));
        assert!(!is_segment_token(words[0], &options));
        assert!(!is_segment_token(words[words.len() - 1], &options));
    }

    #[test]
    fn test_middle_recomputes_against_current_length() {
        let options = CaptionOptions {
            emoji_placement: Placement::Middle,
            hashtags_placement: Placement::Middle,
            mentions_placement: Placement::Middle,
            ..river_options()
        };
        // 4 words: emoji at 2 -> 6 words, mentions at 3 -> 9 words, hashtags at 4
        let out = rule_based_caption("Lovely river walk today", &options);
        assert_eq!(
            out,
            "Lovely river 🌞 📍Paris #sunnyday #nature #walk @alice @bob 🌿 walk today"
        );
    }

    #[test]
    fn test_middle_on_single_word_core() {
        let options = CaptionOptions {
            hashtags: vec!["x".into()],
            hashtags_placement: Placement::Middle,
            ..CaptionOptions::default()
        };
        assert_eq!(rule_based_caption("Hello", &options), "Hello #x");
    }

    #[test]
    fn test_empty_core() {
        let out = rule_based_caption("", &river_options());
        // emoji first, then the middle slot lands at index 1 of the two emoji
        assert_eq!(out, "🌞 📍Paris @alice @bob 🌿 #sunnyday #nature #walk");

        let options = CaptionOptions {
            voice: Voice::We,
            ..CaptionOptions::default()
        };
        assert_eq!(rule_based_caption("", &options), "We");
        assert_eq!(rule_based_caption("   ", &CaptionOptions::default()), "");
    }

    #[test]
    fn test_hashtag_cap_and_duplicates() {
        let options = CaptionOptions {
            hashtags: (0..12).map(|i| format!("tag{}", i)).chain(["tag0".to_string()]).collect(),
            length: CaptionLength::Long,
            ..CaptionOptions::default()
        };
        let out = rule_based_caption("Beach", &options);
        assert_eq!(out.matches('#').count(), MAX_HASHTAGS);
        assert!(out.contains("#tag7"));
        assert!(!out.contains("#tag8"));

        let options = CaptionOptions {
            hashtags: vec!["Sun".into(), "sun".into(), "!!!".into()],
            ..CaptionOptions::default()
        };
        assert_eq!(rule_based_caption("Beach", &options), "Beach #sun #sun");
    }

    #[test]
    fn test_handle_normalization() {
        let options = CaptionOptions {
            include_mentions: true,
            handles: vec!["@@carol".into(), " dave ".into(), "@".into(), "".into()],
            ..CaptionOptions::default()
        };
        assert_eq!(rule_based_caption("Beach", &options), "Beach @carol @dave");
    }

    #[test]
    fn test_punctuation_cleanup() {
        let out = rule_based_caption("What a view , right ?", &CaptionOptions::default());
        assert_eq!(out, "What a view, right?");
    }

    #[test]
    fn test_build_segments_order_and_empties() {
        let segments = build_segments(&river_options());
        let placements: Vec<Placement> = segments.iter().map(|s| s.placement).collect();
        assert_eq!(placements, vec![Placement::Beginning, Placement::Middle, Placement::End]);
        assert_eq!(segments[1].content, "📍Paris @alice @bob");

        let options = CaptionOptions {
            include_emojis: true,
            emojis: Vec::new(),
            ..CaptionOptions::default()
        };
        assert!(build_segments(&options).is_empty());
    }
}
