//! Filesystem-backed storage.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Prefix of annotated copies in the processed directory.
pub const PROCESSED_PREFIX: &str = "processed_";

/// A file written by [`LocalStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Stored file name (no directory)
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
}

/// Stores uploads and their annotated copies in two directories.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    /// Create both directories if they do not exist yet.
    pub async fn init(&self) -> StorageResult<()> {
        for dir in [&self.upload_dir, &self.processed_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::Setup {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Persist a raw upload as `<upload_dir>/<filename>`, replacing any
    /// previous file with the same name.
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> StorageResult<StoredFile> {
        let name = sanitize_filename(filename)?;
        self.write(&self.upload_dir, name, bytes).await
    }

    /// Persist an annotated copy as `<processed_dir>/processed_<filename>`.
    pub async fn save_processed(&self, filename: &str, bytes: &[u8]) -> StorageResult<StoredFile> {
        let name = format!("{}{}", PROCESSED_PREFIX, sanitize_filename(filename)?);
        self.write(&self.processed_dir, name, bytes).await
    }

    async fn write(&self, dir: &Path, name: String, bytes: &[u8]) -> StorageResult<StoredFile> {
        let path = dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), size = bytes.len(), "Stored file");
        Ok(StoredFile { name, path })
    }
}

/// Reduce a client-supplied filename to its final path component.
///
/// Both `/` and `\` are treated as separators. Empty names and the special
/// names `.` and `..` are rejected.
pub fn sanitize_filename(filename: &str) -> StorageResult<String> {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(StorageError::invalid_filename(filename));
    }
    Ok(name.to_string())
}
