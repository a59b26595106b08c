use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{BlobStore, StorageError};
use crate::utils::flatten_storage_path;

/// Route the upload directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Stores photos as flat files in a local directory
pub struct LocalBlobStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: format!("{}{}", public_base_url.trim_end_matches('/'), UPLOADS_ROUTE),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    /// Writes go to `<name>.part` first and are renamed into place only once
    /// complete, so an interrupted upload never leaves a truncated photo
    /// behind a valid URL.
    async fn store(
        &self,
        content: Bytes,
        _content_type: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        let file_name = flatten_storage_path(path);
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(&file_name);
        let partial = self.dir.join(format!("{}.part", file_name));

        if let Err(e) = write_fully(&partial, &content).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(file = %target.display(), size_bytes = content.len(), "Photo written to local disk");
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

async fn write_fully(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}
