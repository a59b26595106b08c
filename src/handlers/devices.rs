use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{ApiError, ApiJson, MessageResponse};

/// List all devices
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.store.list_devices().await?;
    Ok(Json(devices))
}

/// Get a single device by id
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    let device = state.store.get_device(&id).await?;
    Ok(Json(device))
}

/// Create a new device
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<DeviceInput>,
) -> Result<Json<Device>, ApiError> {
    let device = state.store.create_device(&input).await?;
    Ok(Json(device))
}

/// Replace every field of a device
pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<DeviceInput>,
) -> Result<Json<Device>, ApiError> {
    let device = state.store.replace_device(&id, &input).await?;
    Ok(Json(device))
}

/// Delete a device. References to it held by other devices are left as-is.
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_device(&id).await?;
    Ok(MessageResponse::new("Device deleted"))
}

/// Find devices to pair with by nickname, model or brand
pub async fn search_devices(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.store.search_devices(&query).await?;
    Ok(Json(devices))
}
