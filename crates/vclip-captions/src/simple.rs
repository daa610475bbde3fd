//! Simple subtitle serializer (§4.6 Subtitle emission, simple format).
//!
//! Emits plain SRT; all styling is deferred to the `force_style` argument
//! passed to [`vclip_media::burn_subtitles_with_force_style`] at burn time.

use vclip_models::CaptionTrack;

/// `force_style` string for ffmpeg's `subtitles` filter: Arial Black 28pt
/// white, outlined, bottom-center, 40px margin.
pub const FORCE_STYLE: &str = "FontName=Arial Black,FontSize=28,PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BorderStyle=1,Outline=2,Shadow=0,Alignment=2,MarginV=40";

fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let secs = (total_millis / 1_000) % 60;
    let millis = total_millis % 1_000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Serialize a [`CaptionTrack`] to SRT text. Emoji are included inline,
/// since SRT carries no style information of its own.
pub fn serialize_simple(track: &CaptionTrack) -> String {
    let mut out = String::new();

    for (i, segment) in track.segments.iter().enumerate() {
        let text = match &segment.emoji {
            Some(emoji) => format!("{emoji} {}", segment.text),
            None => segment.text.clone(),
        };
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            text
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::{CaptionSegment, CaptionStyle};

    fn track() -> CaptionTrack {
        CaptionTrack {
            segments: vec![
                CaptionSegment {
                    text: "hello world".to_string(),
                    start: 0.0,
                    end: 1.5,
                    words: Vec::new(),
                    style: CaptionStyle::Normal,
                    emoji: None,
                },
                CaptionSegment {
                    text: "amazing stuff".to_string(),
                    start: 1.5,
                    end: 3.0,
                    words: Vec::new(),
                    style: CaptionStyle::Emphasis,
                    emoji: Some("🔥".to_string()),
                },
            ],
        }
    }

    #[test]
    fn formats_timestamp_with_milliseconds() {
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(65.0), "00:01:05,000");
    }

    #[test]
    fn numbers_segments_sequentially() {
        let srt = serialize_simple(&track());
        assert!(srt.starts_with("1\n"));
        assert!(srt.contains("\n2\n"));
    }

    #[test]
    fn includes_emoji_inline() {
        let srt = serialize_simple(&track());
        assert!(srt.contains("🔥 amazing stuff"));
    }

    #[test]
    fn force_style_names_arial_black_and_bottom_alignment() {
        assert!(FORCE_STYLE.contains("Arial Black"));
        assert!(FORCE_STYLE.contains("FontSize=28"));
        assert!(FORCE_STYLE.contains("MarginV=40"));
    }
}
