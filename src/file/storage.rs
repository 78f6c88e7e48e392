//! File storage for filedrop.
//!
//! Uploaded files live directly in a single flat directory under the name the
//! client sent. There is no metadata, no sharding and no locking. Uploads are
//! written to a temporary sibling first and renamed into place once complete,
//! so a later upload with the same name replaces the first only if it succeeds.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::{FiledropError, Result};

/// Prefix of in-flight upload files.
const TEMP_PREFIX: &str = ".filedrop-upload-";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File storage service for the upload directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory all files are stored in.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage, creating the base directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Use `base_path` as-is without touching the filesystem.
    ///
    /// Requests fail with an I/O error until the directory exists.
    pub fn open(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the destination path for a client filename.
    ///
    /// The name is joined verbatim except for leading `/`, which would
    /// otherwise make `Path::join` discard the base directory.
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_path.join(filename.trim_start_matches('/'))
    }

    /// Start writing the file for `filename`.
    ///
    /// Content goes to a fresh temporary file in the destination's directory.
    /// The destination itself is untouched until [`StoredFile::finish`].
    pub async fn create(&self, filename: &str) -> Result<StoredFile> {
        let path = self.file_path(filename);
        let dir = path.parent().unwrap_or(&self.base_path);
        let temp_path = dir.join(format!(
            "{TEMP_PREFIX}{}-{}.part",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let file = File::options()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;

        Ok(StoredFile {
            file,
            temp_path,
            path,
            written: 0,
        })
    }

    /// List the names of all entries in the storage directory, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }
}

/// Check that a client filename stays inside the storage directory.
///
/// Only applied when `storage.reject_unsafe_filenames` is enabled.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(FiledropError::Validation("filename is empty".to_string()));
    }
    if filename == "." || filename == ".." {
        return Err(FiledropError::Validation(format!(
            "invalid filename: {filename}"
        )));
    }
    if let Some(c) = filename.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(FiledropError::Validation(format!(
            "filename must not contain {c:?}"
        )));
    }
    Ok(())
}

/// An upload in progress.
///
/// Dropping it without calling [`finish`](Self::finish) or
/// [`discard`](Self::discard) leaves the temporary file behind.
#[derive(Debug)]
pub struct StoredFile {
    file: File,
    temp_path: PathBuf,
    path: PathBuf,
    written: u64,
}

impl StoredFile {
    /// Append a chunk of content.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the content and move it over the destination.
    ///
    /// Returns the number of bytes written. On failure the temporary file is
    /// removed and the destination keeps its previous content.
    pub async fn finish(mut self) -> Result<u64> {
        let result = match self.file.flush().await {
            Ok(()) => fs::rename(&self.temp_path, &self.path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            self.discard().await;
            return Err(e.into());
        }
        Ok(self.written)
    }

    /// Abandon the upload and remove the temporary file.
    pub async fn discard(self) {
        let Self {
            file, temp_path, ..
        } = self;
        drop(file);

        match fs::remove_file(&temp_path).await {
            Ok(()) => tracing::debug!(path = %temp_path.display(), "Removed partial upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %temp_path.display(),
                error = %e,
                "Failed to remove partial upload"
            ),
        }
    }

    /// Destination path of the upload.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}
