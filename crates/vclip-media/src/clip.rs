//! Clip extraction: seek, scale-and-crop to 9:16, encode (§4.5 step 3).

use std::path::Path;

use tracing::info;
use vclip_models::encoding::{CLIP_HEIGHT, CLIP_WIDTH};
use vclip_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::progress::FfmpegProgress;
use crate::thumbnail::generate_thumbnail;

/// `force_original_aspect_ratio=increase` then center-crop to 9:16.
pub fn vertical_crop_filter() -> String {
    format!("scale={CLIP_WIDTH}:{CLIP_HEIGHT}:force_original_aspect_ratio=increase,crop={CLIP_WIDTH}:{CLIP_HEIGHT}")
}

/// Cut `[start, end)` out of `input`, scale-and-crop to 1080x1920, and encode
/// with `faststart` so the clip is playable before fully downloaded.
pub async fn create_clip<P, F>(input: P, output: P, start: f64, end: f64, encoding: &EncodingConfig, progress_callback: F) -> MediaResult<()>
where
    P: AsRef<Path>,
    F: Fn(FfmpegProgress) + Send + 'static,
{
    let input = input.as_ref();
    let output = output.as_ref();
    let duration = end - start;

    info!("cutting clip {} [{:.3}, {:.3}) -> {}", input.display(), start, end, output.display());

    let cmd = FfmpegCommand::new(input, output)
        .seek(start)
        .duration(duration)
        .video_filter(vertical_crop_filter())
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf)
        .audio_codec(&encoding.audio_codec)
        .audio_bitrate(&encoding.audio_bitrate)
        .output_arg("-movflags")
        .output_arg("+faststart");

    FfmpegRunner::new().run_with_progress(&cmd, progress_callback).await
}

/// Generate a thumbnail at the clip's midpoint, scaled and cropped to 9:16
/// (§4.5 step 5).
pub async fn create_midpoint_thumbnail(clip_path: impl AsRef<Path>, thumb_path: impl AsRef<Path>, duration: f64) -> MediaResult<()> {
    let midpoint = duration / 2.0;
    generate_thumbnail(clip_path, thumb_path, midpoint, &vertical_crop_filter()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_crop_filter_targets_9x16() {
        let filter = vertical_crop_filter();
        assert!(filter.contains("1080"));
        assert!(filter.contains("1920"));
        assert!(filter.contains("increase"));
    }
}
