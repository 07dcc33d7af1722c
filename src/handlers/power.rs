use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::power::{PowerFeed, PowerTopology};
use crate::report::{self, SourceReport};
use crate::AppState;

use super::ApiError;

/// A consumer's resolved power feeds, for the device-detail panel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerFeedsResponse {
    pub device_id: String,
    pub device_name: String,
    pub feeds: Vec<PowerFeed>,
}

/// Full resolved power topology across every rack
pub async fn get_topology(State(state): State<Arc<AppState>>) -> Json<PowerTopology> {
    let devices = state.store.all_devices().await;
    let topology = state.layouts.topology(&devices);
    if !topology.conflicts.is_empty() {
        tracing::warn!(
            "{} power port(s) claimed by more than one device",
            topology.conflicts.len()
        );
    }
    Json((*topology).clone())
}

/// Per-source port tables in the shared report shape
pub async fn list_source_reports(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<SourceReport>> {
    let racks = state.store.list_racks().await;
    let devices: Vec<_> = racks.iter().flat_map(|r| r.devices.iter().cloned()).collect();
    let topology = state.layouts.topology(&devices);
    Json(report::power_report(&racks, &topology))
}

/// Port table for one power source
pub async fn get_source_report(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<Json<SourceReport>, ApiError> {
    let racks = state.store.list_racks().await;
    let devices: Vec<_> = racks.iter().flat_map(|r| r.devices.iter().cloned()).collect();
    let topology = state.layouts.topology(&devices);
    report::power_report(&racks, &topology)
        .into_iter()
        .find(|report| report.source_id == source_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("power source"))
}

/// Resolved feeds for one consumer device (empty for unpowered devices)
pub async fn get_consumer_feeds(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
) -> Result<Json<ConsumerFeedsResponse>, ApiError> {
    let (_, device) = state
        .store
        .find_device(&device_id)
        .await
        .ok_or_else(|| ApiError::not_found("device"))?;

    let devices = state.store.all_devices().await;
    let topology = state.layouts.topology(&devices);
    Ok(Json(ConsumerFeedsResponse {
        device_id: device.id.clone(),
        device_name: device.name.clone(),
        feeds: topology.feeds_for(&device.id).to_vec(),
    }))
}
