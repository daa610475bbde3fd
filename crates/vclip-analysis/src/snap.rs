//! Boundary snapping (§4.4.6): adjust a selected candidate's start/end
//! against detected scene boundaries and transcribed word timings.

use vclip_models::TimedWord;

use crate::window::MIN_CLIP;

const SNAP_TOLERANCE: f64 = 3.0;
const HOOK_BUFFER: f64 = 0.5;
const WORD_EXTENSION_WINDOW: f64 = 2.0;
const WORD_EXTENSION_PADDING: f64 = 0.3;

/// Final, snapped boundaries for an extraction task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedWindow {
    pub start: f64,
    pub end: f64,
}

/// Snap `[start, end)` against `scene_boundaries` (absolute seconds) and
/// `words` (already-transcribed, absolute seconds), per §4.4.6.
pub fn snap_boundaries(start: f64, end: f64, scene_boundaries: &[f64], words: &[TimedWord]) -> SnappedWindow {
    let mut s = nearest_within(start, scene_boundaries, SNAP_TOLERANCE).unwrap_or(start);
    let mut e = nearest_within(end, scene_boundaries, SNAP_TOLERANCE).unwrap_or(end);

    s = (s - HOOK_BUFFER).max(0.0);

    if let Some(word) = words.iter().find(|w| (w.end - e).abs() < WORD_EXTENSION_WINDOW && w.end > e) {
        e = word.end + WORD_EXTENSION_PADDING;
    }

    if e - s < MIN_CLIP {
        e = s + MIN_CLIP;
    }

    SnappedWindow {
        start: (s * 10.0).floor() / 10.0,
        end: (e * 10.0).floor() / 10.0,
    }
}

fn nearest_within(target: f64, boundaries: &[f64], tolerance: f64) -> Option<f64> {
    boundaries
        .iter()
        .copied()
        .filter(|b| (b - target).abs() <= tolerance)
        .min_by(|a, b| (a - target).abs().partial_cmp(&(b - target).abs()).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> TimedWord {
        TimedWord {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn snaps_to_nearby_scene_boundary() {
        let snapped = snap_boundaries(30.0, 60.0, &[31.5], &[]);
        assert!((snapped.start - 31.0).abs() < 0.15);
    }

    #[test]
    fn ignores_distant_scene_boundary() {
        let snapped = snap_boundaries(30.0, 60.0, &[20.0], &[]);
        assert!((snapped.start - 29.5).abs() < 0.001);
    }

    #[test]
    fn extends_end_for_word_ending_within_window() {
        let words = vec![word("done", 0.0, 61.9)];
        let snapped = snap_boundaries(30.0, 60.0, &[], &words);
        assert!((snapped.end - 62.2).abs() < 0.001);
    }

    #[test]
    fn does_not_extend_for_word_ending_outside_window() {
        let words = vec![word("done", 0.0, 62.1)];
        let snapped = snap_boundaries(30.0, 60.0, &[], &words);
        assert!((snapped.end - 60.0).abs() < 0.001);
    }

    #[test]
    fn enforces_minimum_clip_length() {
        let snapped = snap_boundaries(30.0, 31.0, &[], &[]);
        assert!(snapped.end - snapped.start >= MIN_CLIP - 0.001);
    }

    #[test]
    fn hook_buffer_clamped_at_zero() {
        let snapped = snap_boundaries(0.2, 30.0, &[], &[]);
        assert_eq!(snapped.start, 0.0);
    }
}
