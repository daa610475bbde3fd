//! Candidate window generation (§4.4.1).

/// Minimum clip length, in seconds.
pub const MIN_CLIP: f64 = 15.0;
/// Maximum clip length, in seconds.
pub const MAX_CLIP: f64 = 60.0;
/// Step between candidate centers, in seconds.
pub const STEP: f64 = 5.0;
/// Preferred (target) clip length before clamping, in seconds.
pub const PREFERRED: f64 = 30.0;

/// A candidate clip window, integer-second bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Usable range of the video, after trimming intro/outro.
pub fn usable_range(duration: f64) -> (f64, f64) {
    let skip_intro = (25.0_f64).min(0.12 * duration);
    let skip_outro = (20.0_f64).min(0.08 * duration);
    (skip_intro, duration - skip_outro)
}

/// Generate the dense, overlapping set of candidate windows for a video of
/// `duration` seconds, ordered by start time.
///
/// For `t` stepping by `STEP` from `usable_start` to `usable_end - MIN_CLIP`
/// inclusive, emits a window centered on `t` with length `PREFERRED`, clamped
/// independently on each side into `[usable_start, usable_end]`. Windows
/// shorter than `MIN_CLIP` after clamping are discarded.
pub fn generate_candidates(duration: f64) -> Vec<Window> {
    let (usable_start, usable_end) = usable_range(duration);

    if usable_end - usable_start < MIN_CLIP {
        return Vec::new();
    }

    let half = PREFERRED / 2.0;
    let mut candidates = Vec::new();
    let mut t = usable_start;

    while t <= usable_end - MIN_CLIP {
        let start = (t - half).max(usable_start);
        let end = (t + half).min(usable_end);

        if end - start >= MIN_CLIP {
            candidates.push(Window {
                start: start.floor() as i64,
                end: end.floor() as i64,
            });
        }

        t += STEP;
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_window_respects_invariant_1() {
        let duration = 300.0;
        let (usable_start, usable_end) = usable_range(duration);
        let candidates = generate_candidates(duration);
        assert!(!candidates.is_empty());
        for w in candidates {
            let len = w.duration() as f64;
            assert!((MIN_CLIP..=MAX_CLIP).contains(&len), "len={len}");
            assert!(w.start as f64 >= usable_start);
            assert!(w.end as f64 <= usable_end);
        }
    }

    #[test]
    fn candidates_are_ordered_by_start_time() {
        let candidates = generate_candidates(300.0);
        for pair in candidates.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn short_video_stays_within_usable_bounds() {
        let duration = 42.0;
        let (usable_start, usable_end) = usable_range(duration);
        for w in generate_candidates(duration) {
            assert!(w.start as f64 >= usable_start);
            assert!(w.end as f64 <= usable_end);
            assert!(w.duration() >= MIN_CLIP as i64);
        }
    }

    #[test]
    fn very_short_video_yields_no_windows() {
        assert!(generate_candidates(10.0).is_empty());
    }

    #[test]
    fn duration_below_usable_span_yields_no_windows() {
        assert!(usable_range(10.0).1 - usable_range(10.0).0 < MIN_CLIP);
    }
}
