mod config;
mod db;
mod error;
mod handlers;
mod models;
mod photos;
mod router;
mod storage;
mod utils;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use db::Store;
use photos::PhotoUploader;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub photos: PhotoUploader,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gadget_inventory=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting Gadget Inventory API");
    tracing::info!("Database: {}", cfg.database_url);
    tracing::info!("Upload dir: {}", cfg.upload_dir);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.database_url, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    // Local uploads are served from here even when S3 is in use
    if let Err(e) = tokio::fs::create_dir_all(&cfg.upload_dir).await {
        tracing::warn!("Could not create upload dir {}: {}", cfg.upload_dir, e);
    }

    // Pick the photo backend
    let blobs = storage::initialize(&cfg).await;
    let photos = PhotoUploader::new(blobs, cfg.max_upload_bytes);
    tracing::info!(
        "Photo storage ready (backend={}, max_upload_bytes={})",
        photos.backend_name(),
        cfg.max_upload_bytes
    );

    // Create app state
    let state = Arc::new(AppState {
        store,
        config: cfg.clone(),
        photos,
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Gadget Inventory listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gadget Inventory shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
