mod devices;
pub(crate) mod row_helpers;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::error::NotFoundError;
use crate::models::*;

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Connect to the document store with a specific pool size
    pub async fn with_pool_size(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        store.ping().await?;
        Ok(store)
    }

    /// Private in-memory store. A single connection that never expires, since
    /// every SQLite memory connection is its own database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")
    }

    /// Round-trip a trivial query so a bad connection string fails at startup
    async fn ping(&self) -> Result<()> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        tracing::info!("Database reachable ({} devices stored)", count.0);
        Ok(())
    }

    // ========== Device Operations ==========

    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        devices::DeviceRepo::list(&self.pool).await
    }

    /// Fetch one device; `NotFoundError` when the id does not resolve
    pub async fn get_device(&self, id: &str) -> Result<Device> {
        devices::DeviceRepo::get(&self.pool, id)
            .await?
            .ok_or_else(|| NotFoundError::new("Device", id).into())
    }

    pub async fn create_device(&self, input: &DeviceInput) -> Result<Device> {
        devices::DeviceRepo::create(&self.pool, input).await
    }

    pub async fn replace_device(&self, id: &str, input: &DeviceInput) -> Result<Device> {
        devices::DeviceRepo::replace(&self.pool, id, input).await
    }

    pub async fn delete_device(&self, id: &str) -> Result<()> {
        devices::DeviceRepo::delete(&self.pool, id).await
    }

    pub async fn attach_device_photo(
        &self,
        id: &str,
        photo_type: PhotoType,
        url: &str,
    ) -> Result<Device> {
        devices::DeviceRepo::attach_photo(&self.pool, id, photo_type, url).await
    }

    pub async fn search_devices(&self, query: &str) -> Result<Vec<Device>> {
        devices::DeviceRepo::search(&self.pool, query).await
    }
}
