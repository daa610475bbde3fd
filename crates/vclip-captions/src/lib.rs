//! Caption pipeline (§4.6): group acquired words into CaptionSegments,
//! style them, and serialize to either subtitle format.

pub mod ass;
pub mod group;
pub mod simple;
pub mod style;

use vclip_models::{CaptionTrack, TimedWord};

pub use ass::serialize_styled;
pub use simple::{serialize_simple, FORCE_STYLE};

/// Group and style `words` into a complete [`CaptionTrack`].
pub fn build_caption_track(words: &[TimedWord]) -> CaptionTrack {
    let segments = group::group_words(words);
    let segments = style::style_segments(segments);
    CaptionTrack { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> TimedWord {
        TimedWord {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn builds_track_with_styled_first_hook_segment() {
        let words = vec![
            word("what", 0.0, 0.3),
            word("happens", 0.3, 0.6),
            word("next,", 0.6, 0.9),
            word("today", 1.5, 1.8),
        ];
        let track = build_caption_track(&words);
        assert_eq!(track.segments.len(), 2);
        assert_eq!(track.segments[0].style, vclip_models::CaptionStyle::Hook);
    }

    #[test]
    fn empty_words_yields_empty_track() {
        let track = build_caption_track(&[]);
        assert!(track.segments.is_empty());
    }

    #[test]
    fn word_count_matches_input() {
        let words = vec![word("one", 0.0, 0.2), word("two", 0.2, 0.4), word("three", 0.4, 0.6)];
        let track = build_caption_track(&words);
        assert_eq!(track.word_count(), 3);
    }
}
