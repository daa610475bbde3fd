//! Relational job store: typed repositories over a Postgres-backed schema
//! for jobs, videos, segments, and clips.

pub mod clip_repo;
pub mod config;
pub mod error;
pub mod job_repo;
pub mod pool;
pub mod segment_repo;
pub mod video_repo;

pub use clip_repo::ClipRepository;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use job_repo::JobRepository;
pub use pool::init_pool;
pub use segment_repo::SegmentRepository;
pub use video_repo::VideoRepository;
