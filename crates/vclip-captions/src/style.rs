//! Caption styling (§4.6 Styling): the first hook-eligible segment, then
//! excitement/punchline/number rules applied independently per segment.

use std::sync::LazyLock;

use regex::Regex;
use vclip_models::{CaptionSegment, CaptionStyle};

static HOOK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(what|how|why|when|where|look|watch|listen|imagine)\b").expect("static pattern is valid"));
static EXCITEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(amazing|incredible|insane|crazy|wow|unbelievable)\b").expect("static pattern is valid"));
static CONJUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(but|however)\b").expect("static pattern is valid"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("static pattern is valid"));

/// Assign style and emoji to each segment, in place. Only the first segment
/// matching the hook regex becomes `Hook`; every other match is decided
/// independently.
pub fn style_segments(mut segments: Vec<CaptionSegment>) -> Vec<CaptionSegment> {
    let mut hook_assigned = false;

    for segment in segments.iter_mut() {
        if !hook_assigned && HOOK_RE.is_match(&segment.text) {
            segment.style = CaptionStyle::Hook;
            segment.emoji = Some("👀".to_string());
            hook_assigned = true;
            continue;
        }

        if EXCITEMENT_RE.is_match(&segment.text) {
            segment.style = CaptionStyle::Emphasis;
            segment.emoji = Some("🔥".to_string());
        } else if segment.text.contains('!') || CONJUNCTION_RE.is_match(&segment.text) {
            segment.style = CaptionStyle::Punchline;
            segment.emoji = Some("💥".to_string());
        } else if NUMBER_RE.is_match(&segment.text) {
            segment.style = CaptionStyle::Emphasis;
            segment.emoji = Some("✨".to_string());
        } else {
            segment.style = CaptionStyle::Normal;
            segment.emoji = None;
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> CaptionSegment {
        CaptionSegment {
            text: text.to_string(),
            start: 0.0,
            end: 1.0,
            words: Vec::new(),
            style: CaptionStyle::Normal,
            emoji: None,
        }
    }

    #[test]
    fn only_first_matching_segment_becomes_hook() {
        let styled = style_segments(vec![seg("what happens next"), seg("how does this work")]);
        assert_eq!(styled[0].style, CaptionStyle::Hook);
        assert_ne!(styled[1].style, CaptionStyle::Hook);
    }

    #[test]
    fn excitement_word_becomes_emphasis() {
        let styled = style_segments(vec![seg("this is amazing stuff")]);
        assert_eq!(styled[0].style, CaptionStyle::Emphasis);
        assert_eq!(styled[0].emoji.as_deref(), Some("🔥"));
    }

    #[test]
    fn exclamation_becomes_punchline() {
        let styled = style_segments(vec![seg("watch out now!")]);
        // "watch" also matches the hook regex, but hook takes precedence only
        // on the first matching segment; here it is the only segment so it
        // wins as hook rather than punchline.
        assert_eq!(styled[0].style, CaptionStyle::Hook);
    }

    #[test]
    fn conjunction_without_hook_becomes_punchline() {
        let styled = style_segments(vec![seg("however the ending surprised everyone")]);
        assert_eq!(styled[0].style, CaptionStyle::Punchline);
    }

    #[test]
    fn number_becomes_emphasis_with_sparkle() {
        let styled = style_segments(vec![seg("these 5 tips changed everything")]);
        assert_eq!(styled[0].style, CaptionStyle::Emphasis);
        assert_eq!(styled[0].emoji.as_deref(), Some("✨"));
    }

    #[test]
    fn plain_text_stays_normal() {
        let styled = style_segments(vec![seg("the weather today is mild")]);
        assert_eq!(styled[0].style, CaptionStyle::Normal);
        assert!(styled[0].emoji.is_none());
    }
}
