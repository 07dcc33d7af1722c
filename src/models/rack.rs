use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_int, Device};

/// Standard full-height rack
pub const DEFAULT_RACK_HEIGHT: i64 = 45;

/// Rack owns its devices; devices have no lifecycle outside a rack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rack {
    pub id: String,
    pub name: String,
    #[serde(default = "default_height")]
    pub height: i64,
    #[serde(default)]
    pub devices: Vec<Device>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_height() -> i64 {
    DEFAULT_RACK_HEIGHT
}

/// CreateRackRequest for creating new racks
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRackRequest {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height: Option<i64>,
}

/// UpdateRackRequest for renaming or resizing a rack
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRackRequest {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height: Option<i64>,
}
