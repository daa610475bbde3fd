//! Even-distribution fallback when the endpoint returns only `text` (§4.6).

use vclip_models::TimedWord;

use crate::response::{TranscriptionResponse, WordTimestamp};

/// Turn a response's words into `TimedWord`s, falling back to splitting
/// `text` evenly across `[start, end)` when no word timestamps are present.
pub fn acquire_words(response: &TranscriptionResponse, start: f64, end: f64) -> Vec<TimedWord> {
    match &response.words {
        Some(words) if !words.is_empty() => words.iter().map(|w| to_timed_word(w, start)).collect(),
        _ => evenly_distribute(&response.text, start, end),
    }
}

fn to_timed_word(word: &WordTimestamp, window_start: f64) -> TimedWord {
    TimedWord {
        text: word.word.clone(),
        start: window_start + word.start,
        end: window_start + word.end,
    }
}

fn evenly_distribute(text: &str, start: f64, end: f64) -> Vec<TimedWord> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let span = (end - start).max(0.0);
    let per_word = span / words.len() as f64;

    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let word_start = start + per_word * i as f64;
            TimedWord {
                text: (*w).to_string(),
                start: word_start,
                end: word_start + per_word,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_word_timestamps_when_present() {
        let response = TranscriptionResponse {
            text: "hello world".to_string(),
            duration: 1.0,
            words: Some(vec![
                WordTimestamp {
                    word: "hello".to_string(),
                    start: 0.0,
                    end: 0.4,
                    confidence: None,
                },
                WordTimestamp {
                    word: "world".to_string(),
                    start: 0.4,
                    end: 1.0,
                    confidence: None,
                },
            ]),
            segments: None,
        };

        let words = acquire_words(&response, 10.0, 11.0);
        assert_eq!(words.len(), 2);
        assert!((words[0].start - 10.0).abs() < 0.001);
        assert!((words[1].end - 11.0).abs() < 0.001);
    }

    #[test]
    fn evenly_distributes_when_no_word_timestamps() {
        let response = TranscriptionResponse {
            text: "one two three four".to_string(),
            duration: 4.0,
            words: None,
            segments: None,
        };

        let words = acquire_words(&response, 0.0, 4.0);
        assert_eq!(words.len(), 4);
        assert!((words[0].start - 0.0).abs() < 0.001);
        assert!((words[0].end - 1.0).abs() < 0.001);
        assert!((words[3].end - 4.0).abs() < 0.001);
    }

    #[test]
    fn empty_text_yields_no_words() {
        let response = TranscriptionResponse {
            text: String::new(),
            duration: 0.0,
            words: None,
            segments: None,
        };
        assert!(acquire_words(&response, 0.0, 1.0).is_empty());
    }
}
