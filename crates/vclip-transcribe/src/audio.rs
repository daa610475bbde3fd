//! Extracting the mono MP3 submitted to the transcription endpoint (§4.6).

use std::path::Path;

use vclip_media::{FfmpegCommand, FfmpegRunner};

use crate::error::TranscribeResult;

/// Extract a mono MP3 at 128 kb/s from `[start, end)` of `source`.
pub async fn extract_audio(source: impl AsRef<Path>, start: f64, end: f64, output: impl AsRef<Path>) -> TranscribeResult<()> {
    let duration = end - start;

    let cmd = FfmpegCommand::new(source, output)
        .seek(start)
        .duration(duration)
        .output_arg("-vn")
        .output_arg("-ac")
        .output_arg("1")
        .audio_codec("libmp3lame")
        .audio_bitrate("128k");

    FfmpegRunner::new().run(&cmd).await?;
    Ok(())
}
