mod local;
mod remote;

pub use local::{LocalBlobStore, UPLOADS_ROUTE};
use remote::RemoteBlobStore;

use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::Arc;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("local photo write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote photo write failed: {0}")]
    Remote(String),
}

/// A place photos can be written to. Returned URLs go straight into device
/// photo fields.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `content` under `path` and return its public URL
    async fn store(
        &self,
        content: Bytes,
        content_type: &str,
        path: &str,
    ) -> Result<String, StorageError>;

    /// Short backend name for logs and the status endpoint
    fn backend_name(&self) -> &'static str;
}

/// Pick the photo backend. Never fails: any problem with the bucket is
/// logged and the local directory is used instead.
pub async fn initialize(config: &Config) -> Arc<dyn BlobStore> {
    let local = || -> Arc<dyn BlobStore> {
        Arc::new(LocalBlobStore::new(&config.upload_dir, &config.public_base_url))
    };

    let Some(bucket) = config.s3.bucket.as_deref() else {
        tracing::warn!(
            "PHOTO_BUCKET not set - storing photos on local disk in {}",
            config.upload_dir
        );
        return local();
    };

    match RemoteBlobStore::connect(&config.s3, bucket).await {
        Ok(remote) => {
            tracing::info!("Photo storage: S3 bucket {}", bucket);
            Arc::new(remote)
        }
        Err(e) => {
            tracing::warn!(
                "Photo bucket {} unavailable, falling back to local disk in {}: {:#}",
                bucket,
                config.upload_dir,
                e
            );
            local()
        }
    }
}
