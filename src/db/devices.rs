use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::error::{InvalidInputError, NotFoundError};
use crate::models::*;
use crate::utils::{new_device_id, normalize_device_id};

use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = "SELECT id, data FROM devices";

/// Maximum number of devices returned by a search
pub const SEARCH_LIMIT: i64 = 20;

/// Device database operations.
///
/// Every write is a single statement, so each one is atomic for its document.
/// Nothing here touches more than one device.
pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at, id", SELECT_DEVICE))
            .fetch_all(pool)
            .await?;

        rows.iter().map(map_device_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Device>> {
        let id = normalize_device_id(id)?;
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_DEVICE))
            .bind(&id)
            .fetch_optional(pool)
            .await?;

        row.as_ref().map(map_device_row).transpose()
    }

    pub async fn create(pool: &Pool<Sqlite>, input: &DeviceInput) -> Result<Device> {
        input.validate()?;

        let id = new_device_id();
        let data = serde_json::to_string(input)?;
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO devices (
                id, nickname, model, brand,
                nickname_folded, model_folded, brand_folded,
                data, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.nickname)
        .bind(&input.model)
        .bind(&input.brand)
        .bind(fold_case(&input.nickname))
        .bind(fold_case(&input.model))
        .bind(fold_case(&input.brand))
        .bind(&data)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        tracing::info!(device_id = %id, device_type = input.device_type().as_str(), "Device created");

        Self::get(pool, &id)
            .await?
            .context("Device not found after creation")
    }

    /// Overwrite every field of a device.
    /// SQLite counts matched rows, so replacing a document with identical
    /// content still reports one row and succeeds.
    pub async fn replace(pool: &Pool<Sqlite>, id: &str, input: &DeviceInput) -> Result<Device> {
        let id = normalize_device_id(id)?;
        input.validate()?;

        let data = serde_json::to_string(input)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE devices
            SET nickname = ?, model = ?, brand = ?,
                nickname_folded = ?, model_folded = ?, brand_folded = ?,
                data = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.nickname)
        .bind(&input.model)
        .bind(&input.brand)
        .bind(fold_case(&input.nickname))
        .bind(fold_case(&input.model))
        .bind(fold_case(&input.brand))
        .bind(&data)
        .bind(now)
        .bind(&id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Device", &id).into());
        }

        Self::get(pool, &id)
            .await?
            .context("Device not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<()> {
        let id = normalize_device_id(id)?;
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(&id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Device", &id).into());
        }
        Ok(())
    }

    /// Point a photo slot of a device at `url`.
    ///
    /// `thumbnail` and `hover_photo` replace the previous value; the old blob
    /// stays in storage. `gallery` appends a new entry with no caption and no
    /// paired device. Both are evaluated inside one UPDATE.
    pub async fn attach_photo(
        pool: &Pool<Sqlite>,
        id: &str,
        photo_type: PhotoType,
        url: &str,
    ) -> Result<Device> {
        let id = normalize_device_id(id)?;
        let now = Utc::now();

        let query = match photo_type {
            PhotoType::Thumbnail | PhotoType::HoverPhoto => sqlx::query(
                "UPDATE devices SET data = json_set(data, ?, ?), updated_at = ? WHERE id = ?",
            )
            .bind(format!("$.{}", photo_type.as_str()))
            .bind(url.to_string()),
            PhotoType::Gallery => sqlx::query(
                r#"
                UPDATE devices
                SET data = json_set(
                        data,
                        '$.gallery',
                        json_insert(COALESCE(json_extract(data, '$.gallery'), '[]'), '$[#]', json(?))
                    ),
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(serde_json::to_string(&GalleryPhoto::new(url))?),
        };

        let result = query.bind(now).bind(&id).execute(pool).await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Device", &id).into());
        }

        Self::get(pool, &id)
            .await?
            .context("Device not found after photo attach")
    }

    /// Case-insensitive substring search over nickname, model and brand.
    /// Both sides are folded by `fold_case`; SQLite's `lower()` only knows ASCII.
    /// Returns at most `SEARCH_LIMIT` devices, oldest first.
    pub async fn search(pool: &Pool<Sqlite>, query: &str) -> Result<Vec<Device>> {
        if query.trim().is_empty() {
            return Err(InvalidInputError::new("search query is required").into());
        }
        let needle = fold_case(query);

        let rows = sqlx::query(&format!(
            r#"{}
            WHERE instr(nickname_folded, ?) > 0
               OR instr(model_folded, ?) > 0
               OR instr(brand_folded, ?) > 0
            ORDER BY created_at, id
            LIMIT ?"#,
            SELECT_DEVICE
        ))
        .bind(&needle)
        .bind(&needle)
        .bind(&needle)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;

        rows.iter().map(map_device_row).collect()
    }
}

/// Lowercase form stored in the `*_folded` columns and used for search needles
fn fold_case(value: &str) -> String {
    value.to_lowercase()
}
