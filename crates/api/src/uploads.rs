//! Disk storage for uploaded claim documents.
//!
//! Files live under `<UPLOAD_DIR>/claims/<claim_id>/<folder>/<sanitized name>`
//! and are served by the router at `/uploads/...`. Attachments and signature
//! files use separate folders; two uploads with the same name in one folder
//! overwrite each other.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use claimflow_core::attachment::sanitize_file_name;
use claimflow_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::forms::FilePart;

/// URL prefix the upload root is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Per-claim folder an upload is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Attachments,
    Signatures,
}

impl UploadFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadFolder::Attachments => "attachments",
            UploadFolder::Signatures => "signatures",
        }
    }
}

impl fmt::Display for UploadFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized file name as stored on disk.
    pub file_name: String,
    /// Public URL under [`UPLOADS_URL_PREFIX`].
    pub url: String,
}

/// The name a file will be stored under, or 400 when nothing usable is left
/// after sanitizing.
pub fn storable_name(original_name: &str) -> AppResult<String> {
    sanitize_file_name(original_name)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid file name '{original_name}'")))
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one uploaded file into a claim folder.
    pub async fn save(
        &self,
        claim_id: DbId,
        folder: UploadFolder,
        original_name: &str,
        bytes: &[u8],
    ) -> AppResult<StoredFile> {
        let file_name = storable_name(original_name)?;

        let dir = self
            .root
            .join("claims")
            .join(claim_id.to_string())
            .join(folder.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

        tracing::debug!(claim_id, file = %path.display(), size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            url: format!("{UPLOADS_URL_PREFIX}/claims/{claim_id}/{folder}/{file_name}"),
            file_name,
        })
    }

    /// Write a batch of file parts. Every name is checked before anything is
    /// written; if a write fails, the files already written are removed.
    pub async fn save_all(
        &self,
        claim_id: DbId,
        folder: UploadFolder,
        parts: &[&FilePart],
    ) -> AppResult<Vec<StoredFile>> {
        for part in parts {
            storable_name(&part.file_name)?;
        }

        let mut stored = Vec::with_capacity(parts.len());
        for part in parts {
            match self.save(claim_id, folder, &part.file_name, &part.bytes).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.discard(stored.iter().map(|f| f.url.as_str())).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort removal of files whose database write did not happen.
    pub async fn discard<'a>(&self, urls: impl IntoIterator<Item = &'a str>) {
        // Collected up front so no generic iterator is held across `.await`
        // (keeps handler futures `Send` for axum).
        let urls: Vec<&'a str> = urls.into_iter().collect();
        for url in urls {
            if let Err(e) = self.remove_by_url(url).await {
                tracing::warn!(url, error = %e, "Failed to discard upload");
            }
        }
    }

    /// Delete the file behind a stored URL. A file that is already gone is not an error.
    pub async fn remove_by_url(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.path_for_url(url) else {
            tracing::warn!(url, "Refusing to remove file outside the upload root");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::InternalError(format!(
                "Failed to remove upload {}: {e}",
                path.display()
            ))),
        }
    }

    /// Map a public upload URL back to its path on disk.
    ///
    /// Returns `None` for URLs outside [`UPLOADS_URL_PREFIX`] or containing
    /// anything but plain path segments.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(UPLOADS_URL_PREFIX)?.strip_prefix('/')?;
        let relative = Path::new(relative);

        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !plain || relative.as_os_str().is_empty() {
            return None;
        }

        Some(self.root.join(relative))
    }
}
