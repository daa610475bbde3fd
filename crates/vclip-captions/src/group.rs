//! Grouping transcribed words into CaptionSegments (§4.6 Grouping).

use vclip_models::{CaptionSegment, CaptionStyle, TimedWord};

const MIN_WORDS: usize = 2;
const MAX_WORDS: usize = 5;
const GAP_BREAK_SECONDS: f64 = 0.3;

fn ends_with_break_punctuation(word: &str) -> bool {
    word.chars().next_back().is_some_and(|c| matches!(c, ',' | ';' | '.' | '!' | '?'))
}

/// Group `words` into 2-5 word CaptionSegments, targeting 3.
///
/// Breaks at trailing punctuation, a >=0.3s gap to the next word, or a
/// forced break at 5 words. Styling is not assigned here; every segment
/// starts `normal` with no emoji, see [`crate::style::style_segments`].
pub fn group_words(words: &[TimedWord]) -> Vec<CaptionSegment> {
    let mut segments = Vec::new();
    let mut buffer: Vec<TimedWord> = Vec::new();

    for (i, word) in words.iter().enumerate() {
        buffer.push(word.clone());
        let is_last = i + 1 == words.len();
        let forced = buffer.len() >= MAX_WORDS;
        let punctuation_break = ends_with_break_punctuation(&word.text);
        let gap_break = !is_last && words[i + 1].start - word.end >= GAP_BREAK_SECONDS;

        let should_break = forced || is_last || (buffer.len() >= MIN_WORDS && (punctuation_break || gap_break));

        if should_break && !buffer.is_empty() {
            segments.push(flush(&mut buffer));
        }
    }

    segments
}

fn flush(buffer: &mut Vec<TimedWord>) -> CaptionSegment {
    let words = std::mem::take(buffer);
    let text = words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
    let start = words.first().map(|w| w.start).unwrap_or(0.0);
    let end = words.last().map(|w| w.end).unwrap_or(start);

    CaptionSegment {
        text,
        start,
        end,
        words,
        style: CaptionStyle::Normal,
        emoji: None,
    }
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
    fn breaks_at_punctuation() {
        let words = vec![word("hello,", 0.0, 0.3), word("world", 0.3, 0.6), word("today", 0.7, 1.0)];
        let segments = group_words(&words);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "hello, world");
        assert_eq!(segments[1].text, "today");
    }

    #[test]
    fn breaks_at_gap() {
        let words = vec![word("one", 0.0, 0.2), word("two", 0.2, 0.4), word("three", 1.0, 1.2), word("four", 1.2, 1.4)];
        let segments = group_words(&words);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "one two");
        assert_eq!(segments[1].text, "three four");
    }

    #[test]
    fn forces_break_at_five_words() {
        let words: Vec<TimedWord> = (0..6).map(|i| word("w", i as f64, i as f64 + 0.5)).collect();
        let segments = group_words(&words);
        assert_eq!(segments[0].words.len(), 5);
        assert_eq!(segments[1].words.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(group_words(&[]).is_empty());
    }

    #[test]
    fn segment_bounds_match_first_and_last_word() {
        let words = vec![word("one", 1.5, 1.8), word("two", 1.8, 2.4)];
        let segments = group_words(&words);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].start - 1.5).abs() < 0.001);
        assert!((segments[0].end - 2.4).abs() < 0.001);
    }
}
