use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    CreateRackRequest, Device, Rack, UpdateRackRequest, DEFAULT_RACK_HEIGHT,
};

/// Typed not-found error so handlers can map to 404 without string matching
#[derive(Debug)]
pub struct NotFoundError(pub String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

fn not_found(resource: &str) -> anyhow::Error {
    anyhow::Error::new(NotFoundError(resource.to_string()))
}

/// In-memory rack aggregate. The report owns its racks for the lifetime of
/// the process; persistence is deliberately out of scope. Cloneable handle,
/// insertion order preserved.
#[derive(Clone, Default)]
pub struct Store {
    racks: Arc<RwLock<Vec<Rack>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_racks(&self) -> Vec<Rack> {
        self.racks.read().await.clone()
    }

    pub async fn get_rack(&self, rack_id: &str) -> Option<Rack> {
        self.racks.read().await.iter().find(|r| r.id == rack_id).cloned()
    }

    pub async fn create_rack(&self, req: &CreateRackRequest) -> Rack {
        let now = Utc::now();
        let rack = Rack {
            id: uuid::Uuid::new_v4().to_string(),
            name: req.name.clone(),
            height: req.height.unwrap_or(DEFAULT_RACK_HEIGHT),
            devices: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.racks.write().await.push(rack.clone());
        rack
    }

    pub async fn update_rack(&self, rack_id: &str, req: &UpdateRackRequest) -> Result<Rack> {
        let mut racks = self.racks.write().await;
        let rack = racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| not_found("rack"))?;
        rack.name = req.name.clone();
        if let Some(height) = req.height {
            rack.height = height;
        }
        rack.updated_at = Utc::now();
        Ok(rack.clone())
    }

    pub async fn delete_rack(&self, rack_id: &str) -> Result<()> {
        let mut racks = self.racks.write().await;
        let before = racks.len();
        racks.retain(|r| r.id != rack_id);
        if racks.len() == before {
            return Err(not_found("rack"));
        }
        Ok(())
    }

    pub async fn get_device(&self, rack_id: &str, device_id: &str) -> Option<Device> {
        self.get_rack(rack_id)
            .await
            .and_then(|rack| rack.devices.into_iter().find(|d| d.id == device_id))
    }

    /// Find a device anywhere, with its owning rack's id
    pub async fn find_device(&self, device_id: &str) -> Option<(String, Device)> {
        let racks = self.racks.read().await;
        for rack in racks.iter() {
            if let Some(device) = rack.devices.iter().find(|d| d.id == device_id) {
                return Some((rack.id.clone(), device.clone()));
            }
        }
        None
    }

    pub async fn create_device(&self, rack_id: &str, device: Device) -> Result<Device> {
        let mut racks = self.racks.write().await;
        let rack = racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| not_found("rack"))?;
        rack.devices.push(device.clone());
        rack.updated_at = Utc::now();
        Ok(device)
    }

    pub async fn update_device(
        &self,
        rack_id: &str,
        device_id: &str,
        device: Device,
    ) -> Result<Device> {
        let mut racks = self.racks.write().await;
        let rack = racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| not_found("rack"))?;
        let slot = rack
            .devices
            .iter_mut()
            .find(|d| d.id == device_id)
            .ok_or_else(|| not_found("device"))?;
        *slot = device.clone();
        rack.updated_at = Utc::now();
        Ok(device)
    }

    pub async fn delete_device(&self, rack_id: &str, device_id: &str) -> Result<()> {
        let mut racks = self.racks.write().await;
        let rack = racks
            .iter_mut()
            .find(|r| r.id == rack_id)
            .ok_or_else(|| not_found("rack"))?;
        let before = rack.devices.len();
        rack.devices.retain(|d| d.id != device_id);
        if rack.devices.len() == before {
            return Err(not_found("device"));
        }
        rack.updated_at = Utc::now();
        Ok(())
    }

    /// Snapshot of every device across racks, in rack and device order.
    /// Input to the power topology resolver.
    pub async fn all_devices(&self) -> Vec<Device> {
        self.racks
            .read()
            .await
            .iter()
            .flat_map(|rack| rack.devices.iter().cloned())
            .collect()
    }
}
