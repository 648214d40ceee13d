//! Device records returned by the Arlo service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Device categories the CLI can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Base,
    Camera,
    Light,
    Doorbell,
}

impl DeviceKind {
    /// Plural heading used by `list`.
    pub fn label(self) -> &'static str {
        match self {
            DeviceKind::Base => "bases",
            DeviceKind::Camera => "cameras",
            DeviceKind::Light => "lights",
            DeviceKind::Doorbell => "doorbells",
        }
    }

    /// Categories a raw `deviceType` belongs to. Arlo Q units are both a
    /// base station and a camera.
    pub fn from_device_type(device_type: &str) -> &'static [DeviceKind] {
        match device_type.to_ascii_lowercase().as_str() {
            "basestation" => &[DeviceKind::Base],
            "camera" => &[DeviceKind::Camera],
            "arloq" | "arloqs" => &[DeviceKind::Base, DeviceKind::Camera],
            "lights" => &[DeviceKind::Light],
            "doorbell" => &[DeviceKind::Doorbell],
            _ => &[],
        }
    }
}

/// Extra properties block attached to some devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One device as reported by the service. Fields this tool does not use are
/// kept in `extra` so dumps show the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    #[serde(rename = "deviceName", default)]
    pub name: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(
        rename = "presignedLastImageUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<DeviceProperties>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn kinds(&self) -> &'static [DeviceKind] {
        DeviceKind::from_device_type(&self.device_type)
    }

    pub fn is(&self, kind: DeviceKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// Hardware revision, or an empty string when the service omits it.
    pub fn hw_version(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.hw_version.as_deref())
            .unwrap_or("")
    }

    /// Serial number; Arlo uses the device id when no separate serial is sent.
    pub fn serial_number(&self) -> &str {
        self.serial_number.as_deref().unwrap_or(&self.device_id)
    }

    /// Case-insensitive match on name or device id. An absent selector never
    /// matches.
    pub fn matches(&self, name: Option<&str>, device_id: Option<&str>) -> bool {
        let same = |wanted: Option<&str>, actual: &str| {
            wanted.is_some_and(|w| w.to_lowercase() == actual.to_lowercase())
        };
        same(name, &self.name) || same(device_id, &self.device_id)
    }

    /// Cloud id some endpoints want as a header, when the service sent one.
    pub fn xcloud_id(&self) -> Option<&str> {
        self.extra.get("xCloudId").and_then(Value::as_str)
    }
}
