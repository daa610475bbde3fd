//! Shared data models for the ViralClip pipeline: jobs, videos, segments,
//! clips, and their caption/signal sub-records.

pub mod caption;
pub mod clip;
pub mod encoding;
pub mod job;
pub mod segment;
pub mod signals;
pub mod video;

pub use caption::{CaptionSegment, CaptionStyle, CaptionTrack, TimedWord};
pub use clip::{Clip, ClipId, ClipStatus};
pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobOptions, JobStatus, ERROR_MESSAGE_MAX_LEN};
pub use segment::{Segment, SegmentId, SegmentStatus};
pub use signals::{AudioSignal, SignalScores, SpeechSignal, VisualSignal};
pub use video::{RawSourceMetadata, Video, VideoId, VideoStatus};
