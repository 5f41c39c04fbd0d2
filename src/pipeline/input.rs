//! Input validation: check a user-supplied image path, or fetch a legacy URL.
//!
//! The structured/document call paths accept local files only — a URL there
//! is a hard [`AskDocError::UnsupportedInput`]. The single-question legacy
//! path may additionally fetch a remote image over plain HTTP(S) with a short
//! timeout; the bytes are kept in memory, never written to disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AskDocError;

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Validate that `path` is an existing, readable local file.
///
/// Distinguishes missing files from permission problems so the caller gets an
/// actionable message. `not_found` maps a missing path to the caller's error
/// kind (image vs document).
pub fn require_local_file(
    path: &Path,
    not_found: impl FnOnce(PathBuf) -> AskDocError,
) -> Result<(), AskDocError> {
    if !path.is_file() {
        return Err(not_found(path.to_path_buf()));
    }
    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(AskDocError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(not_found(path.to_path_buf())),
    }
}

/// Read a local image file into memory.
pub fn read_local_image(path: &Path) -> Result<Vec<u8>, AskDocError> {
    require_local_file(path, |path| AskDocError::ImageNotFound { path })?;
    let bytes = std::fs::read(path).map_err(|e| AskDocError::Internal(format!("read: {e}")))?;
    debug!("Loaded image from {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Fetch a remote image into memory (legacy single-question capability).
pub async fn fetch_remote_image(url: &str, timeout_secs: u64) -> Result<Vec<u8>, AskDocError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AskDocError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AskDocError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AskDocError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AskDocError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AskDocError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    debug!("Downloaded image from {} ({} bytes)", url, bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/scan.png"));
        assert!(is_url("http://example.com/scan.png"));
        assert!(!is_url("/tmp/scan.png"));
        assert!(!is_url("scan.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn missing_file_maps_to_caller_error() {
        let err = require_local_file(Path::new("/definitely/not/here.png"), |path| {
            AskDocError::ImageNotFound { path }
        })
        .unwrap_err();
        assert!(matches!(err, AskDocError::ImageNotFound { .. }));

        let err = require_local_file(Path::new("/definitely/not/here.pdf"), |path| {
            AskDocError::DocumentNotFound { path }
        })
        .unwrap_err();
        assert!(matches!(err, AskDocError::DocumentNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = require_local_file(dir.path(), |path| AskDocError::ImageNotFound { path })
            .unwrap_err();
        assert!(matches!(err, AskDocError::ImageNotFound { .. }));
    }

    #[test]
    fn read_local_image_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"not-really-a-png").unwrap();
        let bytes = read_local_image(&path).unwrap();
        assert_eq!(bytes, b"not-really-a-png");
    }
}
