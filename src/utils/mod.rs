use uuid::Uuid;

use crate::error::InvalidInputError;

/// Extension used when an uploaded file name has none
pub const DEFAULT_EXTENSION: &str = ".jpg";

const MAX_EXTENSION_LEN: usize = 10;

/// Generate a new device identifier
pub fn new_device_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate and canonicalize a device identifier.
/// Accepts any UUID spelling (upper case, braces, simple) and returns the
/// lowercase hyphenated form the store uses.
pub fn normalize_device_id(id: &str) -> Result<String, InvalidInputError> {
    Uuid::parse_str(id.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| InvalidInputError::new(format!("invalid device id: {}", id)))
}

/// Lowercase extension of an uploaded file name, with the leading dot.
/// Falls back to `.jpg` when the name has no usable extension.
/// e.g., "IMG_0042.JPEG" -> ".jpeg"
pub fn file_extension(filename: &str) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return DEFAULT_EXTENSION.to_string();
    }
    format!(".{}", ext.to_ascii_lowercase())
}

/// Convert a storage path to a single flat file name
/// e.g., "gallery/0b7e.../f00d.jpg" -> "gallery_0b7e..._f00d.jpg"
pub fn flatten_storage_path(path: &str) -> String {
    path.trim_start_matches(['/', '\\'])
        .replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_device_id() {
        let id = "0B7E2E9C-1D2F-4F6A-9C3B-5E8F7A6D4C21";
        assert_eq!(
            normalize_device_id(id).unwrap(),
            "0b7e2e9c-1d2f-4f6a-9c3b-5e8f7a6d4c21"
        );
        assert_eq!(
            normalize_device_id("0b7e2e9c1d2f4f6a9c3b5e8f7a6d4c21").unwrap(),
            "0b7e2e9c-1d2f-4f6a-9c3b-5e8f7a6d4c21"
        );
        assert!(normalize_device_id("").is_err());
        assert!(normalize_device_id("not-an-id").is_err());
        assert!(normalize_device_id("507f1f77bcf86cd799439011").is_err());
    }

    #[test]
    fn test_new_device_id_is_normalized() {
        let id = new_device_id();
        assert_eq!(normalize_device_id(&id).unwrap(), id);
        assert_ne!(new_device_id(), id);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.PNG"), ".png");
        assert_eq!(file_extension("IMG_0042.JPEG"), ".jpeg");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("noext"), ".jpg");
        assert_eq!(file_extension(""), ".jpg");
        assert_eq!(file_extension(".hidden"), ".jpg");
        assert_eq!(file_extension("evil.j/pg"), ".jpg");
        assert_eq!(file_extension("weird.jp g"), ".jpg");
    }

    #[test]
    fn test_flatten_storage_path() {
        assert_eq!(flatten_storage_path("gallery/abc/def.jpg"), "gallery_abc_def.jpg");
        assert_eq!(flatten_storage_path("/thumbnail/x.png"), "thumbnail_x.png");
        assert_eq!(flatten_storage_path("a\\b.jpg"), "a_b.jpg");
        assert_eq!(flatten_storage_path("flat.jpg"), "flat.jpg");
    }
}
