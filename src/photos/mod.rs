use anyhow::Result;
use axum::body::Bytes;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::InvalidInputError;
use crate::models::{PhotoType, PhotoUpload, DEFAULT_PHOTO_CATEGORY};
use crate::storage::BlobStore;
use crate::utils::{file_extension, normalize_device_id};

/// A photo received from a client
pub struct IncomingPhoto<'a> {
    pub content: Bytes,
    pub content_type: &'a str,
    pub filename: &'a str,
    pub photo_type: Option<PhotoType>,
}

/// Validates uploads, gives each a unique storage path and hands it to the
/// blob store selected at startup. Linking the URL to a device is left to
/// `Store::attach_device_photo`.
pub struct PhotoUploader {
    blobs: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl PhotoUploader {
    pub fn new(blobs: Arc<dyn BlobStore>, max_bytes: usize) -> Self {
        Self { blobs, max_bytes }
    }

    pub fn backend_name(&self) -> &'static str {
        self.blobs.backend_name()
    }

    /// Validate and store a photo, optionally scoped to a device.
    /// Nothing is written when validation fails.
    pub async fn upload(
        &self,
        photo: IncomingPhoto<'_>,
        device_id: Option<&str>,
    ) -> Result<PhotoUpload> {
        self.validate(&photo)?;
        let device_id = device_id.map(normalize_device_id).transpose()?;

        let category = photo
            .photo_type
            .map(|t| t.as_str())
            .unwrap_or(DEFAULT_PHOTO_CATEGORY);
        let path = storage_path(category, device_id.as_deref(), photo.filename);
        let size = photo.content.len();

        let url = self
            .blobs
            .store(photo.content, photo.content_type, &path)
            .await?;

        tracing::info!(
            path = %path,
            size_bytes = size,
            backend = self.blobs.backend_name(),
            "Photo stored"
        );

        Ok(PhotoUpload {
            url,
            photo_type: category.to_string(),
            path,
        })
    }

    fn validate(&self, photo: &IncomingPhoto<'_>) -> Result<(), InvalidInputError> {
        if !photo
            .content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
        {
            return Err(InvalidInputError::new(format!(
                "file must be an image (got content type '{}')",
                photo.content_type
            )));
        }
        if photo.content.is_empty() {
            return Err(InvalidInputError::new("file is empty"));
        }
        if photo.content.len() > self.max_bytes {
            return Err(InvalidInputError::new(format!(
                "file exceeds the {} byte upload limit",
                self.max_bytes
            )));
        }
        Ok(())
    }
}

/// `{category}/{device_id}/{token}{ext}` or `{category}/{token}{ext}`.
/// The random token keeps repeated uploads of the same file name apart.
fn storage_path(category: &str, device_id: Option<&str>, filename: &str) -> String {
    let name = format!("{}{}", Uuid::new_v4().simple(), file_extension(filename));
    match device_id {
        Some(id) => format!("{}/{}/{}", category, id, name),
        None => format!("{}/{}", category, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Blob store that remembers every write
    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn store(
            &self,
            content: Bytes,
            content_type: &str,
            path: &str,
        ) -> Result<String, StorageError> {
            self.writes.lock().unwrap().push((
                path.to_string(),
                content_type.to_string(),
                content.len(),
            ));
            Ok(format!("mem://{}", path))
        }

        fn backend_name(&self) -> &'static str {
            "memory"
        }
    }

    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn store(&self, _: Bytes, _: &str, _: &str) -> Result<String, StorageError> {
            Err(StorageError::Remote("quota exceeded".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    fn uploader() -> (Arc<RecordingStore>, PhotoUploader) {
        let blobs = Arc::new(RecordingStore::default());
        (blobs.clone(), PhotoUploader::new(blobs, 1024))
    }

    fn photo<'a>(content_type: &'a str, filename: &'a str, photo_type: Option<PhotoType>) -> IncomingPhoto<'a> {
        IncomingPhoto {
            content: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"),
            content_type,
            filename,
            photo_type,
        }
    }

    #[tokio::test]
    async fn test_non_image_rejected_without_write() {
        let (blobs, uploader) = uploader();

        let err = uploader
            .upload(photo("text/plain", "notes.txt", Some(PhotoType::Gallery)), None)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<InvalidInputError>().is_some());
        assert!(blobs.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_oversized_rejected() {
        let (blobs, uploader) = uploader();

        let mut empty = photo("image/png", "a.png", None);
        empty.content = Bytes::new();
        assert!(uploader.upload(empty, None).await.is_err());

        let mut big = photo("image/png", "a.png", None);
        big.content = Bytes::from(vec![0u8; 1025]);
        let err = uploader.upload(big, None).await.unwrap_err();
        assert!(err.downcast_ref::<InvalidInputError>().is_some());

        assert!(blobs.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_device_scoped_path() {
        let (blobs, uploader) = uploader();
        let device_id = "0b7e2e9c-1d2f-4f6a-9c3b-5e8f7a6d4c21";

        let upload = uploader
            .upload(
                photo("image/jpeg", "IMG_0001.JPG", Some(PhotoType::Thumbnail)),
                Some(device_id),
            )
            .await
            .unwrap();

        let prefix = format!("thumbnail/{}/", device_id);
        assert!(upload.path.starts_with(&prefix), "path: {}", upload.path);
        assert!(upload.path.ends_with(".jpg"));
        assert_eq!(upload.photo_type, "thumbnail");
        assert_eq!(upload.url, format!("mem://{}", upload.path));

        let writes = blobs.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, upload.path);
        assert_eq!(writes[0].1, "image/jpeg");
    }

    #[tokio::test]
    async fn test_unscoped_path_defaults() {
        let (_, uploader) = uploader();

        let upload = uploader
            .upload(photo("image/webp", "", None), None)
            .await
            .unwrap();

        assert!(upload.path.starts_with("general/"));
        assert_eq!(upload.path.matches('/').count(), 1);
        assert!(upload.path.ends_with(".jpg"));
        assert_eq!(upload.photo_type, DEFAULT_PHOTO_CATEGORY);
    }

    #[tokio::test]
    async fn test_same_filename_never_collides() {
        let (_, uploader) = uploader();
        let mut paths = std::collections::HashSet::new();
        for _ in 0..50 {
            let upload = uploader
                .upload(photo("image/jpeg", "same.jpg", Some(PhotoType::Gallery)), None)
                .await
                .unwrap();
            assert!(paths.insert(upload.path));
        }
    }

    #[tokio::test]
    async fn test_malformed_device_id_rejected() {
        let (blobs, uploader) = uploader();
        let err = uploader
            .upload(photo("image/jpeg", "a.jpg", None), Some("../../etc"))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<InvalidInputError>().is_some());
        assert!(blobs.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces() {
        let uploader = PhotoUploader::new(Arc::new(FailingStore), 1024);
        let err = uploader
            .upload(photo("image/jpeg", "a.jpg", None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::Remote(_))
        ));
    }
}
