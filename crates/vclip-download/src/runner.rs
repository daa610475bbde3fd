//! Subprocess invocation of the external download utility: bounded stdout/
//! stderr capture, explicit kill-on-timeout (§6 cancellation policy).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{DownloadError, DownloadResult};
use crate::options::DownloadOptions;

/// Per-invocation timeout (§4.3 step 4, §6 cancellation policy).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);
/// Max captured stdout/stderr size before the invocation is aborted.
pub const MAX_CAPTURED_OUTPUT_BYTES: u64 = 50 * 1024 * 1024;

const BINARY_NAME: &str = "yt-dlp";
const KNOWN_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv"];

/// Run the download utility for `options`, returning the downloaded video
/// file's path. The utility's own `--output` template names the file
/// `video.<ext>`; the extension is decided by yt-dlp's format negotiation,
/// so the output directory is scanned afterward.
pub async fn run_download(options: &DownloadOptions) -> DownloadResult<PathBuf> {
    which::which(BINARY_NAME).map_err(|_| DownloadError::UtilityNotFound)?;

    tokio::fs::create_dir_all(&options.output_dir).await?;

    let argv = options.to_argv();
    info!(url = %options.source_url, "invoking download utility");

    let mut child = Command::new(BINARY_NAME)
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdout = child.stdout.take().expect("stdout piped");
    let mut stderr = child.stderr.take().expect("stderr piped");

    let capture = async {
        let (out, err) = tokio::join!(
            read_bounded(&mut stdout, MAX_CAPTURED_OUTPUT_BYTES),
            read_bounded(&mut stderr, MAX_CAPTURED_OUTPUT_BYTES),
        );
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((status, out?, err?))
    };

    let (status, _stdout_bytes, stderr_bytes) = match tokio::time::timeout(DOWNLOAD_TIMEOUT, capture).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(url = %options.source_url, "download utility exceeded timeout, killing");
            child.start_kill().ok();
            return Err(DownloadError::Timeout(DOWNLOAD_TIMEOUT.as_secs()));
        }
    };

    if !status.success() {
        let stderr_text = String::from_utf8_lossy(&stderr_bytes);
        debug!(stderr = %stderr_text, "download utility stderr");
        return Err(DownloadError::UtilityFailed {
            message: stderr_text.lines().last().unwrap_or("unknown error").to_string(),
            stderr: Some(stderr_text.into_owned()),
        });
    }

    locate_output(&options.output_dir).await
}

/// Read up to `limit` bytes; treat exceeding it as an oversized-output error
/// rather than buffering an unbounded amount of subprocess output.
async fn read_bounded<R: tokio::io::AsyncRead + Unpin>(reader: &mut R, limit: u64) -> Result<Vec<u8>, std::io::Error> {
    let mut buf = Vec::new();
    let mut limited = reader.take(limit + 1);
    limited.read_to_end(&mut buf).await?;
    if buf.len() as u64 > limit {
        buf.truncate(limit as usize);
    }
    Ok(buf)
}

async fn locate_output(dir: &Path) -> DownloadResult<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.file_stem().and_then(|s| s.to_str()) != Some("video") {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if KNOWN_EXTENSIONS.contains(&ext) {
                return Ok(path);
            }
        }
    }

    Err(DownloadError::MissingOutput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn locate_output_finds_known_extension() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("video.mp4"), b"data").await.unwrap();
        tokio::fs::write(dir.path().join("video.info.json"), b"{}").await.unwrap();

        let found = locate_output(dir.path()).await.unwrap();
        assert_eq!(found.file_name().unwrap().to_str().unwrap(), "video.mp4");
    }

    #[tokio::test]
    async fn locate_output_errors_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let result = locate_output(dir.path()).await;
        assert!(matches!(result, Err(DownloadError::MissingOutput)));
    }
}
