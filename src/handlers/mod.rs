pub mod devices;
pub mod photos;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{InvalidInputError, NotFoundError};
use crate::AppState;

/// Error response - `{"error": "message"}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", resource),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Typed errors first (no fragile string matching)
        if let Some(invalid) = err.downcast_ref::<InvalidInputError>() {
            return Self::bad_request(invalid.to_string());
        }
        if let Some(nf) = err.downcast_ref::<NotFoundError>() {
            return Self::not_found(&nf.resource);
        }
        // Details stay in the log, the client gets a generic message
        tracing::error!("Request failed: {:#}", err);
        Self::internal("Internal server error")
    }
}

impl From<InvalidInputError> for ApiError {
    fn from(err: InvalidInputError) -> Self {
        Self::bad_request(err.message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// JSON body extractor whose rejections (bad syntax, missing fields, unknown
/// enum values) are 400s in the usual error format
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Healthcheck endpoint, reports the active photo backend
pub async fn healthcheck(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "API is running successfully!",
        "service": "gadget-inventory",
        "storage": state.photos.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
