//! Caption grouping/styling models produced by the extraction worker's
//! captioning pipeline (§4.5, caption timing/grouping/styling).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single word with its acquired or fallback-distributed timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Visual treatment assigned to a caption segment by the styling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    #[default]
    Normal,
    Emphasis,
    Hook,
    Punchline,
}

impl CaptionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionStyle::Normal => "normal",
            CaptionStyle::Emphasis => "emphasis",
            CaptionStyle::Hook => "hook",
            CaptionStyle::Punchline => "punchline",
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A grouped 2-5 word caption segment with timing and style.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CaptionSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub words: Vec<TimedWord>,
    pub style: CaptionStyle,
    /// Emoji appended by the styling pass, if the lexicon matched one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl CaptionSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A complete caption track for one clip, ready for subtitle serialization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct CaptionTrack {
    pub segments: Vec<CaptionSegment>,
}

impl CaptionTrack {
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }
}
