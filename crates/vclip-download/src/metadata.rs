//! Loading the download utility's companion `--write-info-json` output.

use std::path::Path;

use vclip_models::RawSourceMetadata;

use crate::error::DownloadResult;

/// Read the `video.info.json` companion file next to the downloaded media.
/// Absence of the file is tolerated (§3 `RawSourceMetadata` default).
pub async fn load_companion_metadata(output_dir: &Path) -> DownloadResult<RawSourceMetadata> {
    let info_path = output_dir.join("video.info.json");
    match tokio::fs::read(&info_path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_default()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RawSourceMetadata::default()),
        Err(e) => Err(e.into()),
    }
}
