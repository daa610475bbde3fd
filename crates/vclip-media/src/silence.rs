//! Silence-interval detection via FFmpeg's `silencedetect` filter (§4.4.2
//! audio signal).

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Silence threshold in dBFS.
pub const SILENCE_THRESHOLD_DB: f64 = -50.0;
/// Minimum duration, in seconds, to count as a silent interval.
pub const SILENCE_MIN_DURATION: f64 = 1.0;

/// A detected silent interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

/// Scan `[start, end)` of `path` for silent intervals.
pub async fn detect_silence(path: impl AsRef<Path>, start: f64, end: f64) -> MediaResult<Vec<SilenceInterval>> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let duration = end - start;
    let filter = format!("silencedetect=noise={SILENCE_THRESHOLD_DB}dB:d={SILENCE_MIN_DURATION}");

    let output = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-ss",
            &format!("{start:.3}"),
            "-t",
            &format!("{duration:.3}"),
            "-i",
        ])
        .arg(path.as_ref())
        .args(["-af", &filter, "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "silence scan failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    Ok(parse_silence_log(&String::from_utf8_lossy(&output.stderr), start))
}

/// Parse `silencedetect` markers, offsetting by `window_start` since `-ss`
/// before `-i` resets the decoded stream's timestamps to zero.
fn parse_silence_log(log: &str, window_start: f64) -> Vec<SilenceInterval> {
    let mut intervals = Vec::new();
    let mut pending_start: Option<f64> = None;

    for line in log.lines() {
        if let Some(value) = line.split("silence_start:").nth(1) {
            pending_start = value.trim().split_whitespace().next().and_then(|s| s.parse().ok());
        } else if let Some(value) = line.split("silence_end:").nth(1) {
            if let Some(start) = pending_start.take() {
                if let Some(end) = value.trim().split_whitespace().next().and_then(|s| s.parse::<f64>().ok()) {
                    intervals.push(SilenceInterval {
                        start: window_start + start,
                        end: window_start + end,
                    });
                }
            }
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_silence_markers() {
        let log = "[silencedetect @ 0x0] silence_start: 1.5\n[silencedetect @ 0x0] silence_end: 3.2 | silence_duration: 1.7\n";
        let intervals = parse_silence_log(log, 0.0);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 1.5).abs() < 0.001);
        assert!((intervals[0].end - 3.2).abs() < 0.001);
    }

    #[test]
    fn offsets_by_window_start() {
        let log = "[silencedetect @ 0x0] silence_start: 1.5\n[silencedetect @ 0x0] silence_end: 3.2\n";
        let intervals = parse_silence_log(log, 100.0);
        assert!((intervals[0].start - 101.5).abs() < 0.001);
        assert!((intervals[0].end - 103.2).abs() < 0.001);
    }

    #[test]
    fn ignores_unmatched_start() {
        let log = "[silencedetect @ 0x0] silence_start: 5.0\n";
        assert!(parse_silence_log(log, 0.0).is_empty());
    }
}
