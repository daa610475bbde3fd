//! Mean/max volume detection via FFmpeg's `volumedetect` filter (§4.4.2
//! audio signal).

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Mean and max volume, in dBFS, over a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeStats {
    pub mean_volume_db: f64,
    pub max_volume_db: f64,
}

pub async fn detect_volume(path: impl AsRef<Path>, start: f64, end: f64) -> MediaResult<VolumeStats> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let duration = end - start;

    let output = Command::new("ffmpeg")
        .args([
            "-v",
            "info",
            "-ss",
            &format!("{start:.3}"),
            "-t",
            &format!("{duration:.3}"),
            "-i",
        ])
        .arg(path.as_ref())
        .args(["-af", "volumedetect", "-vn", "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "volume scan failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    parse_volume_log(&String::from_utf8_lossy(&output.stderr)).ok_or_else(|| MediaError::InvalidVideo("volumedetect produced no output".to_string()))
}

fn parse_volume_log(log: &str) -> Option<VolumeStats> {
    let mut mean = None;
    let mut max = None;

    for line in log.lines() {
        if let Some(value) = line.split("mean_volume:").nth(1) {
            mean = value.trim().trim_end_matches(" dB").parse().ok();
        } else if let Some(value) = line.split("max_volume:").nth(1) {
            max = value.trim().trim_end_matches(" dB").parse().ok();
        }
    }

    Some(VolumeStats {
        mean_volume_db: mean?,
        max_volume_db: max?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_volumedetect_log() {
        let log = "[Parsed_volumedetect_0 @ 0x0] mean_volume: -18.3 dB\n[Parsed_volumedetect_0 @ 0x0] max_volume: -2.1 dB\n";
        let stats = parse_volume_log(log).unwrap();
        assert!((stats.mean_volume_db - (-18.3)).abs() < 0.001);
        assert!((stats.max_volume_db - (-2.1)).abs() < 0.001);
    }
}
