//! Staging of uploaded bytes on disk.
//!
//! Extractors need a file-system path (pdfium cannot read from a buffer), so
//! every upload is written into its own `TempDir` under the upload
//! directory. The directory is removed when [`StagedUpload`] is dropped, so
//! concurrent uploads with the same name never collide.

use crate::error::DiagramifyError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An uploaded file written to a private temp directory.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    /// Kept alive until processing completes.
    _temp_dir: TempDir,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reduce a client-supplied filename to its final component.
///
/// Both `/` and `\` count as separators. Empty names and `.`/`..` are
/// rejected.
pub fn sanitize_filename(name: &str) -> Result<String, DiagramifyError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(DiagramifyError::InvalidFilename {
            name: name.to_string(),
        });
    }
    Ok(base.to_string())
}

/// Write `bytes` under `upload_dir` using the sanitised `filename`.
pub async fn stage_upload(
    upload_dir: &Path,
    filename: &str,
    bytes: &[u8],
) -> Result<StagedUpload, DiagramifyError> {
    let name = sanitize_filename(filename)?;

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| DiagramifyError::io(upload_dir, e))?;
    let temp_dir = tempfile::Builder::new()
        .prefix("upload-")
        .tempdir_in(upload_dir)
        .map_err(|e| DiagramifyError::io(upload_dir, e))?;

    let path = temp_dir.path().join(&name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| DiagramifyError::io(&path, e))?;

    debug!("Staged upload {} ({} bytes)", path.display(), bytes.len());
    Ok(StagedUpload {
        path,
        _temp_dir: temp_dir,
    })
}
