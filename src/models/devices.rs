use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

/// Device categories. `miscellaneous` is the older spelling of `misc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Computer,
    Camera,
    Appliance,
    #[serde(alias = "miscellaneous")]
    Misc,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Computer => "computer",
            DeviceType::Camera => "camera",
            DeviceType::Appliance => "appliance",
            DeviceType::Misc => "misc",
        }
    }
}

/// Device status. A plain attribute: any value may replace any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Active,
    Retired,
    Repairing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputerAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens_mount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub megapixels: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub film_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplianceAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_life: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_life: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<String>,
}

/// Category-specific attributes, keyed by the device type.
///
/// On the wire this is the pair `device_type` + `category_attributes`, so a
/// camera can never carry a CPU and a computer can never carry a lens mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryWire", into = "CategoryWire")]
pub enum CategoryAttributes {
    Computer(ComputerAttrs),
    Camera(CameraAttrs),
    Appliance(ApplianceAttrs),
    Misc(MiscAttrs),
}

impl CategoryAttributes {
    /// Attributes of the given category with every field unset
    pub fn empty(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Computer => Self::Computer(ComputerAttrs::default()),
            DeviceType::Camera => Self::Camera(CameraAttrs::default()),
            DeviceType::Appliance => Self::Appliance(ApplianceAttrs::default()),
            DeviceType::Misc => Self::Misc(MiscAttrs::default()),
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Computer(_) => DeviceType::Computer,
            Self::Camera(_) => DeviceType::Camera,
            Self::Appliance(_) => DeviceType::Appliance,
            Self::Misc(_) => DeviceType::Misc,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CategoryWire {
    device_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_attributes: Option<serde_json::Value>,
}

impl TryFrom<CategoryWire> for CategoryAttributes {
    type Error = serde_json::Error;

    fn try_from(wire: CategoryWire) -> Result<Self, Self::Error> {
        let attrs = match wire.category_attributes {
            Some(value) => value,
            None => return Ok(Self::empty(wire.device_type)),
        };
        Ok(match wire.device_type {
            DeviceType::Computer => Self::Computer(serde_json::from_value(attrs)?),
            DeviceType::Camera => Self::Camera(serde_json::from_value(attrs)?),
            DeviceType::Appliance => Self::Appliance(serde_json::from_value(attrs)?),
            DeviceType::Misc => Self::Misc(serde_json::from_value(attrs)?),
        })
    }
}

impl From<CategoryAttributes> for CategoryWire {
    fn from(category: CategoryAttributes) -> Self {
        let device_type = category.device_type();
        let attrs = match category {
            CategoryAttributes::Computer(a) => serde_json::to_value(a),
            CategoryAttributes::Camera(a) => serde_json::to_value(a),
            CategoryAttributes::Appliance(a) => serde_json::to_value(a),
            CategoryAttributes::Misc(a) => serde_json::to_value(a),
        };
        CategoryWire {
            device_type,
            category_attributes: attrs.ok(),
        }
    }
}

/// A part replaced or added during a repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPart {
    pub name: String,
    pub cost: f64,
}

/// One entry of a device's repair history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairEvent {
    #[serde(with = "super::timestamp")]
    pub date: DateTime<Utc>,
    /// repair, upgrade, maintenance, ...
    #[serde(rename = "type")]
    pub repair_type: String,
    pub description: String,
    #[serde(default)]
    pub parts_used: Vec<RepairPart>,
    /// Hours
    pub time_spent: f64,
    #[serde(default)]
    pub photos_before_after: Vec<String>,
}

/// A photo in a device's gallery. `paired_device_id` is a weak reference:
/// the other device may have been deleted since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub paired_device_id: Option<String>,
}

impl GalleryPhoto {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
            paired_device_id: None,
        }
    }
}

/// A pairing with another device. `nickname` and `model` are a snapshot taken
/// when the pairing was made and are not kept in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedDevice {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// DeviceInput is the body of create and replace requests, and the stored
/// document of a device minus its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInput {
    pub nickname: String,
    pub model: String,
    pub brand: String,
    #[serde(flatten)]
    pub category: CategoryAttributes,
    #[serde(with = "super::timestamp")]
    pub adopted_date: DateTime<Utc>,
    pub purchase_price: f64,
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Main card image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Shown on hover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_photo: Option<String>,
    /// Legacy single photo, used when there is no thumbnail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_photo: Option<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryPhoto>,

    #[serde(default)]
    pub paired_devices: Vec<PairedDevice>,
    #[serde(default)]
    pub repairs: Vec<RepairEvent>,
}

impl DeviceInput {
    pub fn device_type(&self) -> DeviceType {
        self.category.device_type()
    }

    /// Check the rules serde cannot express: non-blank names and
    /// non-negative amounts.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        for (field, value) in [
            ("nickname", &self.nickname),
            ("model", &self.model),
            ("brand", &self.brand),
        ] {
            if value.trim().is_empty() {
                return Err(InvalidInputError::new(format!("{} is required", field)));
            }
        }

        check_amount("purchase_price", self.purchase_price)?;
        if let Some(value) = self.current_value {
            if !value.is_finite() {
                return Err(InvalidInputError::new("current_value must be a number"));
            }
        }
        if let CategoryAttributes::Camera(CameraAttrs {
            megapixels: Some(mp),
            ..
        }) = &self.category
        {
            check_amount("megapixels", *mp)?;
        }

        for photo in &self.gallery {
            if photo.url.trim().is_empty() {
                return Err(InvalidInputError::new("gallery photo url is required"));
            }
        }
        for paired in &self.paired_devices {
            if paired.device_id.trim().is_empty() {
                return Err(InvalidInputError::new("paired device_id is required"));
            }
        }
        for repair in &self.repairs {
            check_amount("time_spent", repair.time_spent)?;
            for part in &repair.parts_used {
                check_amount("part cost", part.cost)?;
            }
        }
        Ok(())
    }
}

fn check_amount(field: &str, value: f64) -> Result<(), InvalidInputError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidInputError::new(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

/// Device is a stored device record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: DeviceInput,
}
