//! Viral-trigger lexicon (§4.4.3): weighted regex patterns applied to
//! transcribed text.

use regex::Regex;
use std::sync::LazyLock;

/// One lexicon entry: a compiled pattern and its weight.
pub struct Trigger {
    pub name: &'static str,
    pub weight: f64,
    pattern: Regex,
}

impl Trigger {
    fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn word_pattern(words: &[&str]) -> Regex {
    let alternation = words.join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("static lexicon pattern is valid")
}

static LEXICON: LazyLock<Vec<Trigger>> = LazyLock::new(|| {
    vec![
        Trigger {
            name: "interrogative",
            weight: 0.80,
            pattern: word_pattern(&["what", "how", "why", "when", "where"]),
        },
        Trigger {
            name: "excitement",
            weight: 0.90,
            pattern: word_pattern(&["amazing", "incredible", "insane", "crazy", "wow", "unbelievable"]),
        },
        Trigger {
            name: "controversy",
            weight: 0.85,
            pattern: word_pattern(&["secret", "truth", "exposed", "reveal", "hidden"]),
        },
        Trigger {
            name: "action",
            weight: 0.70,
            pattern: word_pattern(&["watch", "look", "see", "check", "discover"]),
        },
        Trigger {
            name: "numeric_list",
            weight: 0.80,
            pattern: Regex::new(r"(?i)\d+\s+(ways|tips|tricks|secrets|things|reasons)").expect("static lexicon pattern is valid"),
        },
        Trigger {
            name: "call_to_action",
            weight: 0.60,
            pattern: word_pattern(&["subscribe", "like", "comment", "share", "follow"]),
        },
    ]
});

/// A trigger match found in a text span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub name: &'static str,
    pub weight: f64,
}

/// Every lexicon entry matching `text`, in lexicon order.
pub fn matches(text: &str) -> Vec<Match> {
    LEXICON
        .iter()
        .filter(|t| t.is_match(text))
        .map(|t| Match {
            name: t.name,
            weight: t.weight,
        })
        .collect()
}

/// Whether `text` contains an interrogative or excitement trigger, used by
/// the hook-bonus condition (§4.4.4).
pub fn has_hook_trigger(text: &str) -> bool {
    LEXICON
        .iter()
        .take(2)
        .any(|t| t.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_interrogative() {
        let found = matches("What happens next?");
        assert!(found.iter().any(|m| m.name == "interrogative"));
    }

    #[test]
    fn matches_numeric_list_prefix() {
        let found = matches("5 ways to improve your life");
        assert!(found.iter().any(|m| m.name == "numeric_list"));
    }

    #[test]
    fn matches_multiple_triggers() {
        let found = matches("the secret truth about this amazing trick, subscribe now");
        assert!(found.len() >= 3);
    }

    #[test]
    fn no_match_on_plain_text() {
        assert!(matches("the weather today is mild").is_empty());
    }

    #[test]
    fn hook_trigger_detects_excitement_word() {
        assert!(has_hook_trigger("this is amazing"));
        assert!(!has_hook_trigger("subscribe and share"));
    }
}
