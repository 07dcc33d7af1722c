use serde::{Deserialize, Serialize};

use super::lenient_int;

/// Canonical device status values
pub mod device_status {
    pub const ACTIVE: &str = "active";
    pub const OFFLINE: &str = "offline";
    pub const MAINTENANCE: &str = "maintenance";

    pub const ALL: &[&str] = &[ACTIVE, OFFLINE, MAINTENANCE];

    pub fn is_valid(status: &str) -> bool {
        status.is_empty() || ALL.contains(&status)
    }
}

/// Closed set of device kinds resolved from the open `type` tag.
/// Unrecognized tags map to `Other`, never to a silent lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    Server,
    Switch,
    Router,
    Firewall,
    PatchPanel,
    Storage,
    Kvm,
    Pdu,
    Ups,
    Other,
}

impl DeviceKind {
    /// Resolve a free-form type tag, case-insensitively
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "server" => Self::Server,
            "switch" => Self::Switch,
            "router" => Self::Router,
            "firewall" => Self::Firewall,
            "patch-panel" | "patchpanel" | "patch_panel" => Self::PatchPanel,
            "storage" | "san" | "nas" => Self::Storage,
            "kvm" | "console" => Self::Kvm,
            "pdu" => Self::Pdu,
            "ups" => Self::Ups,
            _ => Self::Other,
        }
    }

    /// PDU and UPS devices feed others through numbered ports
    pub fn is_power_source(self) -> bool {
        matches!(self, Self::Pdu | Self::Ups)
    }
}

/// One power-source port feeding this device.
/// A device may carry several of these (dual-corded / redundant power).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerConnection {
    pub source_id: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
}

/// Device represents one physical unit mounted in a rack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    // Topmost occupied unit; the device spans downward from here
    #[serde(default, deserialize_with = "lenient_int")]
    pub start_unit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub unit_span: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub power_connections: Vec<PowerConnection>,
    // Explicit port capacity when this device is itself a power source
    #[serde(
        default,
        alias = "outlets",
        alias = "ports",
        deserialize_with = "lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub port_count: Option<i64>,
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_tag(&self.device_type)
    }

    /// Effective unit span: defaults to 1, never below 1
    pub fn span(&self) -> i64 {
        self.unit_span.unwrap_or(1).max(1)
    }
}

/// CreateDeviceRequest for adding a device to a rack
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub start_unit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub unit_span: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub power_connections: Vec<PowerConnection>,
    #[serde(
        default,
        alias = "outlets",
        alias = "ports",
        deserialize_with = "lenient_int"
    )]
    pub port_count: Option<i64>,
}

impl CreateDeviceRequest {
    pub fn into_device(self, id: String) -> Device {
        Device {
            id,
            name: self.name,
            device_type: self.device_type,
            start_unit: self.start_unit,
            unit_span: self.unit_span,
            status: self.status,
            power_connections: self.power_connections,
            port_count: self.port_count,
        }
    }
}

/// UpdateDeviceRequest replaces a device's editable fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub start_unit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub unit_span: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub power_connections: Vec<PowerConnection>,
    #[serde(
        default,
        alias = "outlets",
        alias = "ports",
        deserialize_with = "lenient_int"
    )]
    pub port_count: Option<i64>,
}

impl UpdateDeviceRequest {
    pub fn into_device(self, id: String) -> Device {
        Device {
            id,
            name: self.name,
            device_type: self.device_type,
            start_unit: self.start_unit,
            unit_span: self.unit_span,
            status: self.status,
            power_connections: self.power_connections,
            port_count: self.port_count,
        }
    }
}
