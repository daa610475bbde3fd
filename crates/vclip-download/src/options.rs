//! Argv builder for the external download utility (§6).
//!
//! Built as an explicit `Vec<String>` argv rather than a shell string, so
//! nothing here is ever subject to shell interpolation of an untrusted URL.

use std::path::Path;

/// A client-identity override passed to the download utility so it presents
/// as a browser rather than the default CLI identity.
const CLIENT_IDENTITY: &str = "web";

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub source_url: String,
    pub output_dir: std::path::PathBuf,
    pub socket_timeout_secs: u32,
    pub retries: u32,
    pub fragment_retries: u32,
}

impl DownloadOptions {
    pub fn new(source_url: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            source_url: source_url.into(),
            output_dir: output_dir.as_ref().to_path_buf(),
            socket_timeout_secs: 30,
            retries: 15,
            fragment_retries: 15,
        }
    }

    /// Build the argv (§6): format selection, companion metadata, no
    /// playlist expansion, bounded socket/retry behavior.
    pub fn to_argv(&self) -> Vec<String> {
        let output_template = self.output_dir.join("video.%(ext)s");
        vec![
            "--no-check-certificates".to_string(),
            "--no-warnings".to_string(),
            "--ignore-errors".to_string(),
            "--format".to_string(),
            "best[ext=mp4]/best".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--write-info-json".to_string(),
            "--write-thumbnail".to_string(),
            "--no-playlist".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
            "--retries".to_string(),
            self.retries.to_string(),
            "--fragment-retries".to_string(),
            self.fragment_retries.to_string(),
            "--extractor-args".to_string(),
            format!("youtube:player_client={CLIENT_IDENTITY}"),
            self.source_url.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_contains_required_flags_and_url() {
        let opts = DownloadOptions::new("https://youtube.com/watch?v=abc", "/tmp/job-1");
        let argv = opts.to_argv();
        assert!(argv.contains(&"--format".to_string()));
        assert!(argv.contains(&"best[ext=mp4]/best".to_string()));
        assert!(argv.last().unwrap() == "https://youtube.com/watch?v=abc");
        assert!(argv.iter().any(|a| a.contains("video.%(ext)s")));
    }
}
