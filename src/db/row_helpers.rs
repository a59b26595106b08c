use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Row};

use crate::models::*;

/// Map a SQLite row (`id`, `data`) to a Device.
/// `data` holds the JSON document; a document that no longer parses is an
/// error rather than a silently defaulted record.
pub fn map_device_row(row: &SqliteRow) -> Result<Device> {
    let id: String = row.get("id");
    let data: String = row.get("data");
    let fields: DeviceInput = serde_json::from_str(&data)
        .with_context(|| format!("Corrupt device document: {}", id))?;
    Ok(Device { id, fields })
}
