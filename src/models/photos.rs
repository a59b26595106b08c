use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::InvalidInputError;

/// Path category used when an upload does not say what kind of photo it is
pub const DEFAULT_PHOTO_CATEGORY: &str = "general";

/// Which photo slot of a device an upload is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoType {
    Thumbnail,
    HoverPhoto,
    Gallery,
}

impl PhotoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::Thumbnail => "thumbnail",
            PhotoType::HoverPhoto => "hover_photo",
            PhotoType::Gallery => "gallery",
        }
    }
}

impl FromStr for PhotoType {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "thumbnail" => Ok(PhotoType::Thumbnail),
            "hover_photo" => Ok(PhotoType::HoverPhoto),
            "gallery" => Ok(PhotoType::Gallery),
            other => Err(InvalidInputError::new(format!(
                "photo_type must be one of: thumbnail, hover_photo, gallery (got '{}')",
                other
            ))),
        }
    }
}

/// PhotoUpload describes a stored photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUpload {
    pub url: String,
    pub photo_type: String,
    /// Storage path (object key) the photo was written under
    pub path: String,
}
