//! Auto-generated Clip title/description/tags (§4.5 step 7).

const TITLE_MAX_LEN: usize = 60;
const BASE_TAGS: &[&str] = &["shorts", "viral", "trending", "highlight", "fyp"];
const MAX_TITLE_WORD_TAGS: usize = 6;

fn emoji_for_composite(composite: f64) -> &'static str {
    if composite >= 0.9 {
        "🔥"
    } else if composite >= 0.8 {
        "⭐"
    } else {
        "✨"
    }
}

fn truncate_chars(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Build the Clip title: source Video title truncated to 60 chars, plus an
/// emoji keyed on the Segment's composite score.
pub fn build_title(source_title: &str, composite: f64) -> String {
    format!("{} {}", truncate_chars(source_title, TITLE_MAX_LEN), emoji_for_composite(composite))
}

/// Build the Clip description, including the engagement percentage.
pub fn build_description(reason: &str, composite: f64) -> String {
    format!("{reason} ({:.0}% engagement)", composite * 100.0)
}

/// Build the deduplicated, ordered tag list: the fixed base tags followed by
/// the first 6 distinct lowercase 4+-letter words drawn from the title.
pub fn build_tags(title: &str) -> Vec<String> {
    let mut tags: Vec<String> = BASE_TAGS.iter().map(|t| t.to_string()).collect();

    for word in title.split_whitespace() {
        let lower: String = word.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
        if lower.chars().count() < 4 {
            continue;
        }
        if tags.contains(&lower) {
            continue;
        }
        tags.push(lower);
        if tags.len() >= BASE_TAGS.len() + MAX_TITLE_WORD_TAGS {
            break;
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_titles_to_sixty_chars() {
        let long = "x".repeat(100);
        let title = build_title(&long, 0.5);
        assert_eq!(title.chars().count(), TITLE_MAX_LEN + 2);
    }

    #[test]
    fn emoji_keyed_on_composite_tier() {
        assert!(build_title("t", 0.95).ends_with('🔥'));
        assert!(build_title("t", 0.85).ends_with('⭐'));
        assert!(build_title("t", 0.5).ends_with('✨'));
    }

    #[test]
    fn description_includes_engagement_percentage() {
        let desc = build_description("strong hook", 0.873);
        assert!(desc.contains("87% engagement"));
    }

    #[test]
    fn tags_dedup_and_cap_at_six_title_words() {
        let tags = build_tags("amazing amazing secrets tricks wow short a");
        assert!(tags.starts_with(&["shorts".to_string(), "viral".to_string(), "trending".to_string(), "highlight".to_string(), "fyp".to_string()]));
        assert_eq!(tags.iter().filter(|t| *t == "amazing").count(), 1);
        assert!(!tags.contains(&"a".to_string()));
    }
}
