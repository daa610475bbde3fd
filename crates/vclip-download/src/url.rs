//! Source URL recognition and platform-ID extraction (§6).

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{DownloadError, DownloadResult};

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"youtube\.com/watch\?v=(?P<id>[^&\n?#]+)").unwrap(),
            Regex::new(r"youtu\.be/(?P<id>[^&\n?#]+)").unwrap(),
            Regex::new(r"youtube\.com/embed/(?P<id>[^&\n?#]+)").unwrap(),
            Regex::new(r"youtube\.com/v/(?P<id>[^&\n?#]+)").unwrap(),
        ]
    })
}

/// Extract the platform-level video identifier from a source URL using the
/// four recognized patterns. Fails fast with `invalid_url` (§4.3 step 2) if
/// none match.
pub fn extract_video_id(source_url: &str) -> DownloadResult<String> {
    for pattern in patterns() {
        if let Some(caps) = pattern.captures(source_url) {
            if let Some(id) = caps.name("id") {
                if !id.as_str().is_empty() {
                    return Ok(id.as_str().to_string());
                }
            }
        }
    }

    Err(DownloadError::InvalidUrl(source_url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123&t=5s").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn extracts_from_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/abc123").unwrap(), "abc123");
    }

    #[test]
    fn extracts_from_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc123").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn extracts_from_v_url() {
        assert_eq!(extract_video_id("https://www.youtube.com/v/abc123").unwrap(), "abc123");
    }

    #[test]
    fn rejects_unrecognized_url() {
        assert!(extract_video_id("https://example.com/video").is_err());
    }
}
