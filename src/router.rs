use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::storage::UPLOADS_ROUTE;
use crate::AppState;

/// Room for multipart boundaries and form fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let upload_dir = state.config.upload_dir.clone();

    // Photo upload routes
    let uploads = Router::new()
        .route("/upload-photo", post(handlers::photos::upload_photo))
        .route("/devices/:id/upload-photo", post(handlers::photos::upload_device_photo))
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .route("/", get(handlers::healthcheck))
        // Device routes
        .route(
            "/devices",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route("/devices/search/:query", get(handlers::devices::search_devices))
        .route(
            "/devices/:id",
            get(handlers::devices::get_device)
                .put(handlers::devices::update_device)
                .delete(handlers::devices::delete_device),
        )
        .merge(uploads)
        // Locally stored photos
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
