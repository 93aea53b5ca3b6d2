//! Audio artifact storage
//!
//! Synthesized audio lives in a shared ephemeral directory, one uniquely
//! named file per request, addressed by an opaque handle. Voice uploads are
//! transient and guarded by [`TempUpload`], which removes the file when the
//! guard drops, including when the request future is cancelled mid-flight.

use crate::utils::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Generate a fresh artifact handle. Random per artifact, never sequential
/// or content-derived, so concurrent requests cannot collide.
fn new_handle(extension: &str) -> String {
    format!("tts_{}.{}", Uuid::new_v4().simple(), extension)
}

/// Shared ephemeral store for synthesized audio artifacts
#[derive(Debug, Clone)]
pub struct AudioStore {
    base_dir: PathBuf,
}

impl AudioStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed
    pub async fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir).await?;
        }
        info!("Audio store initialized at: {}", base_dir.display());
        Ok(Self { base_dir })
    }

    /// Write an artifact under a fresh unique handle and return the handle
    pub async fn store(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let handle = new_handle(extension);
        let path = self.base_dir.join(&handle);
        fs::write(&path, bytes).await?;
        debug!(handle = %handle, bytes = bytes.len(), "Audio artifact stored");
        Ok(handle)
    }

    /// Resolve a handle to the path of an existing artifact.
    ///
    /// Handles containing path separators or parent references are rejected
    /// outright; a well-formed handle with no backing file is
    /// `ArtifactNotFound`.
    pub fn resolve(&self, handle: &str) -> Result<PathBuf> {
        if handle.is_empty()
            || handle.contains('/')
            || handle.contains('\\')
            || handle.contains("..")
        {
            return Err(RelayError::ArtifactNotFound(handle.to_string()));
        }

        let path = self.base_dir.join(handle);
        if !path.is_file() {
            return Err(RelayError::ArtifactNotFound(handle.to_string()));
        }
        Ok(path)
    }

    /// Directory the store writes into
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Scoped guard for an uploaded voice file.
///
/// The file is written once and removed in `Drop`, so cleanup holds on
/// every exit path: transcription success, transcription failure, and
/// cancellation of the request future.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Persist upload bytes under a unique name in `dir`, keeping the
    /// original extension so downstream format detection still works
    pub async fn write(dir: &Path, original_filename: &str, bytes: &[u8]) -> Result<Self> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();
        let path = dir.join(format!("upload_{}.{}", Uuid::new_v4().simple(), extension));

        if !dir.exists() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "Voice upload persisted");
        Ok(Self { path })
    }

    /// Path of the persisted upload
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
