//! Styled subtitle serializer (§4.6 Subtitle emission, styled format).
//!
//! Emits Advanced SubStation Alpha with four named styles baked in, burned
//! directly via [`vclip_media::burn_subtitles`] (the `ass` filter needs no
//! further styling at burn time).

use vclip_models::{CaptionStyle, CaptionTrack};

const CANVAS_WIDTH: u32 = 1080;
const CANVAS_HEIGHT: u32 = 1920;
const BOTTOM_MARGIN_PX: u32 = 60;

/// `&HAABBGGRR` colours for the four named styles.
const WHITE: &str = "&H00FFFFFF";
const YELLOW: &str = "&H0000FFFF";
const GREEN: &str = "&H0000FF00";
const ORANGE: &str = "&H0000A5FF";

struct StyleDef {
    name: &'static str,
    font_size: u32,
    colour: &'static str,
}

const STYLES: &[StyleDef] = &[
    StyleDef { name: "Normal", font_size: 70, colour: WHITE },
    StyleDef { name: "Emphasis", font_size: 80, colour: YELLOW },
    StyleDef { name: "Hook", font_size: 85, colour: GREEN },
    StyleDef { name: "Punchline", font_size: 75, colour: ORANGE },
];

fn style_name(style: CaptionStyle) -> &'static str {
    match style {
        CaptionStyle::Normal => "Normal",
        CaptionStyle::Emphasis => "Emphasis",
        CaptionStyle::Hook => "Hook",
        CaptionStyle::Punchline => "Punchline",
    }
}

/// Format seconds as an ASS timestamp, `H:MM:SS.CC` (centiseconds).
fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_centis = (seconds * 100.0).round() as u64;
    let hours = total_centis / 360_000;
    let minutes = (total_centis / 6_000) % 60;
    let secs = (total_centis / 100) % 60;
    let centis = total_centis % 100;
    format!("{hours}:{minutes:02}:{secs:02}.{centis:02}")
}

/// Serialize a [`CaptionTrack`] to styled ASS text.
pub fn serialize_styled(track: &CaptionTrack) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str(&format!("PlayResX: {CANVAS_WIDTH}\n"));
    out.push_str(&format!("PlayResY: {CANVAS_HEIGHT}\n"));
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n\n");

    out.push_str("[V4+ Styles]\n");
    out.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    for s in STYLES {
        out.push_str(&format!(
            "Style: {},Arial Black,{},{},&H000000FF,&H00000000,&H64000000,0,0,0,0,100,100,0,0,1,3,0,2,20,20,{},1\n",
            s.name, s.font_size, s.colour, BOTTOM_MARGIN_PX
        ));
    }
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
    for segment in &track.segments {
        let text = match &segment.emoji {
            Some(emoji) => format!("{emoji} {}", segment.text),
            None => segment.text.clone(),
        };
        out.push_str(&format!(
            "Dialogue: 0,{},{},{},,0,0,{},,{}\n",
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            style_name(segment.style),
            BOTTOM_MARGIN_PX,
            text
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::{CaptionSegment, TimedWord};

    fn track() -> CaptionTrack {
        CaptionTrack {
            segments: vec![CaptionSegment {
                text: "what happens next".to_string(),
                start: 1.2,
                end: 2.5,
                words: vec![TimedWord {
                    text: "what".to_string(),
                    start: 1.2,
                    end: 1.5,
                }],
                style: CaptionStyle::Hook,
                emoji: Some("👀".to_string()),
            }],
        }
    }

    #[test]
    fn formats_timestamp_with_centiseconds() {
        assert_eq!(format_timestamp(1.2), "0:00:01.20");
        assert_eq!(format_timestamp(65.5), "0:01:05.50");
    }

    #[test]
    fn contains_all_four_named_styles() {
        let ass = serialize_styled(&track());
        for name in ["Normal", "Emphasis", "Hook", "Punchline"] {
            assert!(ass.contains(&format!("Style: {name}")));
        }
    }

    #[test]
    fn dialogue_line_uses_segment_style_and_emoji() {
        let ass = serialize_styled(&track());
        assert!(ass.contains("Hook,,0,0,60,,👀 what happens next"));
    }

    #[test]
    fn canvas_dimensions_match_vertical_target() {
        let ass = serialize_styled(&track());
        assert!(ass.contains("PlayResX: 1080"));
        assert!(ass.contains("PlayResY: 1920"));
    }
}
