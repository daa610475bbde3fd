//! Per-window signal records produced by the analysis worker's scorers
//! (§4.4.2) and persisted alongside a Segment.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Audio signal for a candidate window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AudioSignal {
    pub mean_volume_db: f64,
    pub max_volume_db: f64,
    /// Number of silence intervals (threshold -50dB, min duration 1s).
    pub silence_count: u32,
    /// Number of detected loud moments.
    pub loud_moment_count: u32,
    /// Whether a loud moment occurs in the window's first 3 seconds.
    pub loud_moment_in_first_3s: bool,
    /// Composite audio engagement score in `[0, 1]`.
    pub score: f64,
}

impl AudioSignal {
    /// Neutral fallback substituted when the audio probe fails (§4.4.2).
    pub fn fallback() -> Self {
        Self {
            mean_volume_db: -30.0,
            max_volume_db: -10.0,
            silence_count: 0,
            loud_moment_count: 0,
            loud_moment_in_first_3s: false,
            score: 0.52,
        }
    }
}

/// Visual (scene-change) signal for a candidate window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct VisualSignal {
    pub scene_change_count: u32,
    pub changes_per_minute: f64,
    pub score: f64,
}

impl VisualSignal {
    pub fn fallback() -> Self {
        Self {
            scene_change_count: 0,
            changes_per_minute: 0.0,
            score: 0.5,
        }
    }
}

/// Speech/transcript signal for a candidate window.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SpeechSignal {
    pub word_count: u32,
    /// Words per second.
    pub density: f64,
    /// Number of viral-trigger matches (§4.4.3).
    pub trigger_count: u32,
    /// Whether the window's first 3 seconds contain an interrogative or
    /// excitement trigger (part of the hook-bonus condition, §4.4.4).
    pub hook_trigger_in_first_3s: bool,
    pub score: f64,
}

impl SpeechSignal {
    pub fn fallback() -> Self {
        Self {
            word_count: 0,
            density: 0.0,
            trigger_count: 0,
            hook_trigger_in_first_3s: false,
            score: 0.5,
        }
    }
}

/// The four named signal components stored in `Segment.signals` (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SignalScores {
    pub audio: f64,
    pub visual: f64,
    pub speech: f64,
    pub engagement: f64,
}
