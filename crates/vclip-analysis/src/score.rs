//! Composite scoring (§4.4.4): hook bonus, position/duration adjustments,
//! confidence, and the reason-string table.

use vclip_models::{AudioSignal, SignalScores, SpeechSignal, VisualSignal};

/// Window placement, needed to compute the position/duration adjustments.
#[derive(Debug, Clone, Copy)]
pub struct WindowMeta {
    pub start: f64,
    pub end: f64,
    pub video_duration: f64,
}

impl WindowMeta {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn position(&self) -> f64 {
        if self.video_duration > 0.0 {
            self.start / self.video_duration
        } else {
            0.0
        }
    }
}

/// The scored outcome for one candidate window.
#[derive(Debug, Clone)]
pub struct RetentionAnalysis {
    pub composite: f64,
    pub confidence: f64,
    pub reason: String,
    pub signals: SignalScores,
}

/// Score one candidate window from its computed signals and placement.
/// A pure function: same inputs always produce the same output.
pub fn score(audio: &AudioSignal, visual: &VisualSignal, speech: &SpeechSignal, meta: &WindowMeta) -> RetentionAnalysis {
    let position = meta.position();
    let duration = meta.duration();

    let hook_bonus = (speech.hook_trigger_in_first_3s || audio.loud_moment_in_first_3s) && position < 0.3;
    let speech_score = if hook_bonus { (speech.score + 0.25).min(1.0) } else { speech.score };

    let mut composite = 0.40 * audio.score + 0.35 * speech_score + 0.25 * visual.score;

    if (0.3..=0.7).contains(&position) {
        composite *= 1.05;
    } else if position < 0.15 || position > 0.85 {
        composite *= 0.95;
    }

    if (30.0..=45.0).contains(&duration) {
        composite *= 1.03;
    } else if !(15.0..=60.0).contains(&duration) {
        composite *= 0.95;
    }

    composite = composite.clamp(0.0, 1.0);

    let mut confidence: f64 = 0.5;
    if audio.loud_moment_count > 0 {
        confidence += 0.15;
    }
    confidence += 0.1; // silence data is always gathered alongside volume
    if visual.scene_change_count > 0 {
        confidence += 0.15;
    }
    if speech.word_count > 0 {
        confidence += 0.2;
    }
    if speech.trigger_count > 0 {
        confidence += 0.1;
    }
    confidence = confidence.min(1.0);

    let reason = reason_string(audio.score, visual.score, speech_score, composite, hook_bonus);

    RetentionAnalysis {
        composite,
        confidence,
        reason,
        signals: SignalScores {
            audio: audio.score,
            visual: visual.score,
            speech: speech_score,
            engagement: composite,
        },
    }
}

fn reason_string(audio: f64, visual: f64, speech: f64, composite: f64, hook_bonus: bool) -> String {
    let dominant = if audio >= visual && audio >= speech {
        "audio"
    } else if visual >= speech {
        "visual"
    } else {
        "speech"
    };

    let mut reason = if composite >= 0.95 {
        format!("exceptional {dominant} engagement throughout")
    } else if composite >= 0.9 {
        format!("outstanding {dominant} engagement")
    } else if composite >= 0.85 {
        format!("strong {dominant} engagement")
    } else if composite >= 0.8 {
        format!("solid {dominant} engagement")
    } else if composite >= 0.75 {
        format!("good {dominant} engagement")
    } else if composite >= 0.7 {
        format!("moderate {dominant} engagement")
    } else {
        format!("baseline {dominant} engagement")
    };

    if hook_bonus {
        reason.push_str(", strong opening hook detected!");
    }

    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(start: f64, end: f64, video_duration: f64) -> WindowMeta {
        WindowMeta { start, end, video_duration }
    }

    #[test]
    fn composite_stays_within_unit_interval() {
        let audio = AudioSignal {
            mean_volume_db: -5.0,
            max_volume_db: -1.0,
            silence_count: 0,
            loud_moment_count: 3,
            loud_moment_in_first_3s: true,
            score: 1.0,
        };
        let visual = VisualSignal {
            scene_change_count: 20,
            changes_per_minute: 40.0,
            score: 1.0,
        };
        let speech = SpeechSignal {
            word_count: 20,
            density: 3.0,
            trigger_count: 5,
            hook_trigger_in_first_3s: true,
            score: 1.0,
        };
        let analysis = score(&audio, &visual, &speech, &meta(0.0, 35.0, 600.0));
        assert!((0.0..=1.0).contains(&analysis.composite));
    }

    #[test]
    fn hook_bonus_appends_reason_suffix_near_video_start() {
        let audio = AudioSignal::fallback();
        let visual = VisualSignal::fallback();
        let mut speech = SpeechSignal::fallback();
        speech.hook_trigger_in_first_3s = true;
        speech.word_count = 5;

        let analysis = score(&audio, &visual, &speech, &meta(0.0, 30.0, 600.0));
        assert!(analysis.reason.ends_with("strong opening hook detected!"));
    }

    #[test]
    fn hook_bonus_not_applied_past_30_percent_position() {
        let audio = AudioSignal::fallback();
        let visual = VisualSignal::fallback();
        let mut speech = SpeechSignal::fallback();
        speech.hook_trigger_in_first_3s = true;

        let analysis = score(&audio, &visual, &speech, &meta(400.0, 430.0, 600.0));
        assert!(!analysis.reason.contains("hook detected"));
    }

    #[test]
    fn confidence_increases_with_evidence() {
        let mut audio = AudioSignal::fallback();
        audio.loud_moment_count = 1;
        let mut visual = VisualSignal::fallback();
        visual.scene_change_count = 1;
        let mut speech = SpeechSignal::fallback();
        speech.word_count = 10;
        speech.trigger_count = 1;

        let rich = score(&audio, &visual, &speech, &meta(0.0, 30.0, 600.0));
        let sparse = score(&AudioSignal::fallback(), &VisualSignal::fallback(), &SpeechSignal::fallback(), &meta(0.0, 30.0, 600.0));
        assert!(rich.confidence > sparse.confidence);
        assert!(rich.confidence <= 1.0);
    }
}
