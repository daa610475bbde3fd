//! Viral-moment detection: candidate window generation, per-window signal
//! scoring, the trigger lexicon, ranking, and boundary snapping.
//!
//! The scoring pipeline is exposed as pure functions over typed signal
//! records ([`score::score`]) so it can be property-tested independent of
//! the worker/queue plumbing that drives it in production.

pub mod error;
pub mod lexicon;
pub mod score;
pub mod select;
pub mod signals;
pub mod snap;
pub mod window;

pub use error::{AnalysisError, AnalysisResult};
pub use score::{score, RetentionAnalysis, WindowMeta};
pub use select::{select_non_overlapping, ScoredWindow};
pub use signals::{compute_audio_signal, compute_speech_signal, compute_visual_signal};
pub use snap::{snap_boundaries, SnappedWindow};
pub use window::{generate_candidates, usable_range, Window, MAX_CLIP, MIN_CLIP, PREFERRED, STEP};
