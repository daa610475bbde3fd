#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for video processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation support via tokio
//! - Fixed 9:16 clip extraction and thumbnail generation
//! - Scene-change and silence-interval detection for the analysis signals
//! - Subtitle burn-in

pub mod clip;
pub mod command;
pub mod error;
pub mod probe;
pub mod progress;
pub mod scene;
pub mod silence;
pub mod subtitle_burn;
pub mod thumbnail;
pub mod volume;

pub use clip::{create_clip, create_midpoint_thumbnail, vertical_crop_filter};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use scene::{count_scene_changes, detect_scene_boundaries, SCENE_CHANGE_THRESHOLD};
pub use silence::{detect_silence, SilenceInterval, SILENCE_MIN_DURATION, SILENCE_THRESHOLD_DB};
pub use subtitle_burn::{burn_subtitles, burn_subtitles_with_force_style};
pub use thumbnail::generate_thumbnail;
pub use volume::{detect_volume, VolumeStats};
