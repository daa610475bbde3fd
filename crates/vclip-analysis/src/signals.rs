//! Per-candidate signal computation (§4.4.2): audio, visual, speech.
//!
//! All three run against an already-downloaded source file and an absolute
//! `[start, end)` window. Any probe failure substitutes the neutral
//! fallback so the window is still scored.

use std::path::Path;

use tracing::warn;

use vclip_media::{count_scene_changes, detect_silence, detect_volume, SilenceInterval};
use vclip_models::{AudioSignal, SpeechSignal, VisualSignal};

use crate::lexicon;

fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Compute the audio signal for `[start, end)` of the source at `path`.
pub async fn compute_audio_signal(path: impl AsRef<Path>, start: f64, end: f64) -> AudioSignal {
    let path = path.as_ref();
    let duration = (end - start).max(0.001);

    let volume = match detect_volume(path, start, end).await {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "audio probe failed, using fallback signal");
            return AudioSignal::fallback();
        }
    };

    let silence = detect_silence(path, start, end).await.unwrap_or_else(|err| {
        warn!(error = %err, "silence detection failed, assuming no silence");
        Vec::new()
    });

    audio_signal_from(volume.mean_volume_db, volume.max_volume_db, &silence, start, end, duration)
}

fn audio_signal_from(mean_db: f64, max_db: f64, silence: &[SilenceInterval], start: f64, end: f64, duration: f64) -> AudioSignal {
    let range = (max_db - mean_db).max(0.0);
    let energy = 0.6 * normalize(mean_db, -60.0, 0.0) + 0.4 * (range / 30.0).clamp(0.0, 1.0);
    let dynamic_range_score = (range / 30.0).clamp(0.0, 1.0);

    // A loud moment is the onset of sound right after a detected silent
    // interval: the only burst signal the available probes expose directly.
    let loud_moments: Vec<f64> = silence.iter().map(|s| s.end).filter(|&t| t >= start && t < end).collect();
    let loud_moment_count = loud_moments.len() as u32;
    let loud_moment_in_first_3s = loud_moments.iter().any(|&t| t < start + 3.0);

    let loud_moment_density = (loud_moment_count as f64 / (duration / 10.0).max(1.0)).clamp(0.0, 1.0);
    let silence_seconds: f64 = silence
        .iter()
        .map(|s| (s.end.min(end) - s.start.max(start)).max(0.0))
        .sum();
    let silence_ratio = (silence_seconds / duration).clamp(0.0, 1.0);

    let score = (0.4 * energy + 0.3 * dynamic_range_score + 0.2 * loud_moment_density - 0.1 * silence_ratio).clamp(0.0, 1.0);

    AudioSignal {
        mean_volume_db: mean_db,
        max_volume_db: max_db,
        silence_count: silence.len() as u32,
        loud_moment_count,
        loud_moment_in_first_3s,
        score,
    }
}

/// Compute the visual signal for `[start, end)` of the source at `path`.
pub async fn compute_visual_signal(path: impl AsRef<Path>, start: f64, end: f64) -> VisualSignal {
    let duration_minutes = ((end - start) / 60.0).max(1.0 / 60.0);

    match count_scene_changes(path.as_ref(), start, end).await {
        Ok(count) => visual_signal_from(count, duration_minutes),
        Err(err) => {
            warn!(error = %err, "scene-change probe failed, using fallback signal");
            VisualSignal::fallback()
        }
    }
}

fn visual_signal_from(scene_change_count: u32, duration_minutes: f64) -> VisualSignal {
    const IDEAL_CHANGES_PER_MINUTE: f64 = 8.0;

    let changes_per_minute = scene_change_count as f64 / duration_minutes;
    let rate_score = 1.0 - ((changes_per_minute - IDEAL_CHANGES_PER_MINUTE).abs() / IDEAL_CHANGES_PER_MINUTE).clamp(0.0, 1.0);
    let has_variety = if scene_change_count >= 2 { 1.0 } else { 0.0 };

    VisualSignal {
        scene_change_count,
        changes_per_minute,
        score: (0.6 * rate_score + 0.4 * has_variety).clamp(0.0, 1.0),
    }
}

/// Compute the speech signal from already-transcribed text spanning
/// `[start, end)`.
pub fn compute_speech_signal(text: &str, word_count: u32, start: f64, end: f64) -> SpeechSignal {
    let duration = (end - start).max(0.001);
    let density = word_count as f64 / duration;
    let triggers = lexicon::matches(text);
    let trigger_count = triggers.len() as u32;

    let density_closeness = 1.0 - ((density - 3.0).abs() / 3.0).clamp(0.0, 1.0);
    let trigger_norm = (trigger_count as f64 / 3.0).clamp(0.0, 1.0);
    let content_present = if word_count > 0 { 1.0 } else { 0.0 };

    SpeechSignal {
        word_count,
        density,
        trigger_count,
        hook_trigger_in_first_3s: lexicon::has_hook_trigger(&first_n_seconds_prefix(text, start, end, 3.0)),
        score: (0.4 * density_closeness + 0.4 * trigger_norm + 0.2 * content_present).clamp(0.0, 1.0),
    }
}

/// Approximates "the text spoken in the window's first `n` seconds" by
/// taking a proportional prefix of the words, since word-level timing is
/// handled upstream by the caption pipeline rather than here.
fn first_n_seconds_prefix(text: &str, start: f64, end: f64, n: f64) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }
    let duration = (end - start).max(0.001);
    let fraction = (n / duration).clamp(0.0, 1.0);
    let take = (((words.len() as f64) * fraction).ceil() as usize).clamp(1, words.len());

    words[..take].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_signal_rewards_wide_dynamic_range() {
        let quiet = audio_signal_from(-40.0, -35.0, &[], 0.0, 30.0, 30.0);
        let dynamic = audio_signal_from(-20.0, -2.0, &[], 0.0, 30.0, 30.0);
        assert!(dynamic.score > quiet.score);
    }

    #[test]
    fn audio_signal_penalizes_silence() {
        let silence = vec![SilenceInterval { start: 0.0, end: 25.0 }];
        let loud = audio_signal_from(-20.0, -2.0, &[], 0.0, 30.0, 30.0);
        let mostly_silent = audio_signal_from(-20.0, -2.0, &silence, 0.0, 30.0, 30.0);
        assert!(mostly_silent.score < loud.score);
    }

    #[test]
    fn visual_signal_rewards_ideal_rate() {
        let ideal = visual_signal_from(8, 1.0);
        let static_scene = visual_signal_from(0, 1.0);
        assert!(ideal.score > static_scene.score);
    }

    #[test]
    fn speech_signal_rewards_triggers_and_density() {
        let engaging = compute_speech_signal("what an amazing secret revealed today watch this", 8, 0.0, 3.0);
        let flat = compute_speech_signal("the meeting is scheduled for later today", 6, 0.0, 30.0);
        assert!(engaging.score > flat.score);
        assert!(engaging.trigger_count >= 3);
    }

    #[test]
    fn empty_speech_yields_fallback_like_score() {
        let empty = compute_speech_signal("", 0, 0.0, 20.0);
        assert_eq!(empty.word_count, 0);
        assert!(!empty.hook_trigger_in_first_3s);
    }
}
