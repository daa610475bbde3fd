//! Scene-change detection via FFmpeg's `select` filter (§4.4.2 visual signal).

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Scene-change sensitivity threshold (0.0-1.0, lower is more sensitive).
pub const SCENE_CHANGE_THRESHOLD: f64 = 0.3;

/// Detect scene-change boundary timestamps (absolute, seconds from the
/// source's start) in `[start, end)` via `showinfo`'s `pts_time` field.
pub async fn detect_scene_boundaries(path: impl AsRef<Path>, start: f64, end: f64) -> MediaResult<Vec<f64>> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let duration = end - start;
    let filter = format!("select='gt(scene,{SCENE_CHANGE_THRESHOLD})',showinfo");

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
        .args(["-vf", &filter, "-an", "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "scene-change scan failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    Ok(parse_scene_boundaries(&String::from_utf8_lossy(&output.stderr), start))
}

fn parse_scene_boundaries(log: &str, window_start: f64) -> Vec<f64> {
    log.lines()
        .filter(|line| line.contains("Parsed_showinfo"))
        .filter_map(|line| line.split("pts_time:").nth(1))
        .filter_map(|rest| rest.trim().split_whitespace().next())
        .filter_map(|s| s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.').parse::<f64>().ok())
        .map(|pts| window_start + pts)
        .collect()
}

/// Count scene changes in `[start, end)`, the number of boundaries detected
/// by [`detect_scene_boundaries`].
pub async fn count_scene_changes(path: impl AsRef<Path>, start: f64, end: f64) -> MediaResult<u32> {
    Ok(detect_scene_boundaries(path, start, end).await?.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_matches_spec_value() {
        assert!((SCENE_CHANGE_THRESHOLD - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_pts_time_from_showinfo_lines() {
        let log = "[Parsed_showinfo_1 @ 0x0] n:   0 pts:   1234 pts_time:5.2   duration:1\n\
                    [Parsed_showinfo_1 @ 0x0] n:   1 pts:   2468 pts_time:10.75  duration:1\n";
        let boundaries = parse_scene_boundaries(log, 100.0);
        assert_eq!(boundaries.len(), 2);
        assert!((boundaries[0] - 105.2).abs() < 0.001);
        assert!((boundaries[1] - 110.75).abs() < 0.001);
    }
}
