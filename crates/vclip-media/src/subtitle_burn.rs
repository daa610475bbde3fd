//! Burning a subtitle file into a clip via the `ass`/`subtitles` video filter
//! (§4.5 step 4, the external burn-in tool's contract).

use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Escape a path for embedding inside an FFmpeg filtergraph argument.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\").replace(':', "\\:").replace('\'', "\\'")
}

/// Re-encode `input` with an ASS `subtitle_path` burned in, copying audio
/// untouched. Used for the styled caption format, whose per-segment styles
/// are already baked into the file.
pub async fn burn_subtitles(input: impl AsRef<Path>, subtitle_path: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaResult<()> {
    let subtitle_path = subtitle_path.as_ref();
    let filter = format!("ass='{}'", escape_filter_path(subtitle_path));

    let cmd = FfmpegCommand::new(input, output).video_filter(filter).audio_codec("copy").output_arg("-movflags").output_arg("+faststart");

    FfmpegRunner::new().run(&cmd).await
}

/// Re-encode `input` with a plain `.srt` at `subtitle_path` burned in using
/// `force_style`, copying audio untouched. Used for the simple caption
/// fallback format, whose styling lives in the filter arg rather than the
/// subtitle file itself.
pub async fn burn_subtitles_with_force_style(
    input: impl AsRef<Path>,
    subtitle_path: impl AsRef<Path>,
    force_style: &str,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let subtitle_path = subtitle_path.as_ref();
    let filter = format!("subtitles='{}':force_style='{}'", escape_filter_path(subtitle_path), force_style);

    let cmd = FfmpegCommand::new(input, output).video_filter(filter).audio_codec("copy").output_arg("-movflags").output_arg("+faststart");

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn escapes_colons_in_windows_style_paths() {
        let escaped = escape_filter_path(&PathBuf::from("C:/tmp/caption.ass"));
        assert!(escaped.contains("\\:"));
    }
}
