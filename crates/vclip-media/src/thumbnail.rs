//! Thumbnail generation.

use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Extract a single frame at `timestamp_secs`, applying `filter` to it.
pub async fn generate_thumbnail(video_path: impl AsRef<Path>, output_path: impl AsRef<Path>, timestamp_secs: f64, filter: &str) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    let cmd = FfmpegCommand::new(video_path, output_path)
        .seek(timestamp_secs)
        .single_frame()
        .video_filter(filter)
        .log_level("error");

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::encoding::THUMBNAIL_SCALE_WIDTH;

    #[test]
    fn scale_filter_contains_target_width() {
        let filter = format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH);
        assert!(filter.contains("480"));
    }
}
