//! Input resolution: validate a local path, or stage uploaded bytes on disk.
//!
//! pdfium and calamine open files by path and the format is chosen from the
//! extension, so an upload is written into a fresh `TempDir` under its own
//! sanitised name. The directory is removed when [`StagedUpload`] drops.

use crate::error::InvoiceError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An uploaded document written to a private temp directory.
pub struct StagedUpload {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fail with [`InvoiceError::NotFound`] unless `path` is an existing file.
pub fn ensure_exists(path: &Path) -> Result<(), InvoiceError> {
    if path.is_file() {
        debug!("Resolved local file: {}", path.display());
        Ok(())
    } else {
        Err(InvoiceError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Write `bytes` to `<tempdir>/<file_name>`.
pub async fn stage_upload(file_name: &str, bytes: &[u8]) -> Result<StagedUpload, InvoiceError> {
    let temp_dir = TempDir::new().map_err(|e| InvoiceError::Internal(format!("tempdir: {e}")))?;
    let path = temp_dir.path().join(sanitize_file_name(file_name));

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| InvoiceError::Internal(format!("Failed to write temp file: {e}")))?;

    debug!("Staged {} bytes at {}", bytes.len(), path.display());
    Ok(StagedUpload {
        path,
        _temp_dir: temp_dir,
    })
}

/// Keep only the final path component of a client-supplied name.
///
/// Separators from either platform are treated as directory boundaries so a
/// name like `..\\..\\x.pdf` cannot escape the temp directory.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    match base {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}
