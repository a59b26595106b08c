use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::photos::IncomingPhoto;
use crate::AppState;

use super::ApiError;

/// Fields of a photo upload form
struct UploadForm {
    content: Bytes,
    content_type: String,
    filename: String,
    photo_type: Option<PhotoType>,
}

impl UploadForm {
    fn photo(&self) -> IncomingPhoto<'_> {
        IncomingPhoto {
            content: self.content.clone(),
            content_type: &self.content_type,
            filename: &self.filename,
            photo_type: self.photo_type,
        }
    }
}

/// Read a multipart body with a `file` part and an optional `photo_type`
/// field. A body cut short by the client fails here, before anything is
/// stored.
async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut file: Option<(Bytes, String, String)> = None;
    let mut photo_type = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                file = Some((content, content_type, filename));
            }
            "photo_type" | "photoType" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                if !value.trim().is_empty() {
                    photo_type = Some(value.parse::<PhotoType>()?);
                }
            }
            _ => {}
        }
    }

    let (content, content_type, filename) =
        file.ok_or_else(|| ApiError::bad_request("file is required"))?;
    Ok(UploadForm {
        content,
        content_type,
        filename,
        photo_type,
    })
}

/// Upload a photo without linking it to a device; the client stores the
/// returned URL in a later create or update
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUpload>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let upload = state.photos.upload(form.photo(), None).await?;
    Ok(Json(upload))
}

/// Upload a photo and attach it to a device in one call
pub async fn upload_device_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUpload>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let photo_type = form
        .photo_type
        .ok_or_else(|| ApiError::bad_request("photo_type is required"))?;

    // Resolve the device first so a bad id never leaves an orphaned blob
    let device = state.store.get_device(&id).await?;

    let upload = state.photos.upload(form.photo(), Some(&device.id)).await?;
    state
        .store
        .attach_device_photo(&device.id, photo_type, &upload.url)
        .await?;

    tracing::info!(device_id = %device.id, photo_type = photo_type.as_str(), "Photo attached");
    Ok(Json(upload))
}
