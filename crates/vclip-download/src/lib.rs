//! Download-utility subprocess wrapper: source URL recognition and a
//! black-box yt-dlp-shaped CLI invocation with bounded output capture.

pub mod error;
pub mod metadata;
pub mod options;
pub mod runner;
pub mod url;

pub use error::{DownloadError, DownloadResult};
pub use metadata::load_companion_metadata;
pub use options::DownloadOptions;
pub use runner::{run_download, DOWNLOAD_TIMEOUT, MAX_CAPTURED_OUTPUT_BYTES};
pub use url::extract_video_id;
