//! Ranking and non-overlapping selection (§4.4.5).

use crate::window::Window;

/// A scored candidate ready for ranking.
#[derive(Debug, Clone, Copy)]
pub struct ScoredWindow {
    pub window: Window,
    pub composite: f64,
    pub confidence: f64,
}

/// Sort by `(composite desc, confidence desc)` and greedily pick the next
/// candidate that does not overlap any already-selected window (half-open
/// interval intersection), until `top_n` are chosen.
pub fn select_non_overlapping(candidates: &[ScoredWindow], top_n: usize) -> Vec<ScoredWindow> {
    let mut ordered: Vec<ScoredWindow> = candidates.to_vec();
    ordered.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut selected: Vec<ScoredWindow> = Vec::with_capacity(top_n);
    for candidate in ordered {
        if selected.len() >= top_n {
            break;
        }
        if selected.iter().all(|s| !overlaps(&s.window, &candidate.window)) {
            selected.push(candidate);
        }
    }
    selected
}

fn overlaps(a: &Window, b: &Window) -> bool {
    a.start < b.end && b.start < a.end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sw(start: i64, end: i64, composite: f64) -> ScoredWindow {
        ScoredWindow {
            window: Window { start, end },
            composite,
            confidence: 0.5,
        }
    }

    #[test]
    fn picks_highest_composite_first() {
        let candidates = vec![sw(0, 30, 0.6), sw(100, 130, 0.9), sw(200, 230, 0.7)];
        let selected = select_non_overlapping(&candidates, 8);
        assert_eq!(selected[0].window.start, 100);
    }

    #[test]
    fn rejects_overlapping_lower_ranked_candidates() {
        let candidates = vec![sw(0, 30, 0.9), sw(15, 45, 0.8), sw(30, 60, 0.7)];
        let selected = select_non_overlapping(&candidates, 8);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].window.start, 0);
        assert_eq!(selected[1].window.start, 30);
    }

    #[test]
    fn caps_at_top_n() {
        let candidates: Vec<ScoredWindow> = (0..20).map(|i| sw(i * 40, i * 40 + 30, 0.5 + i as f64 * 0.001)).collect();
        let selected = select_non_overlapping(&candidates, 8);
        assert_eq!(selected.len(), 8);
    }

    #[test]
    fn half_open_intervals_permit_adjacent_windows() {
        assert!(!overlaps(&Window { start: 0, end: 30 }, &Window { start: 30, end: 60 }));
        assert!(overlaps(&Window { start: 0, end: 30 }, &Window { start: 29, end: 59 }));
    }
}
