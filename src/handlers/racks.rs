use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{CreateRackRequest, Rack, UpdateRackRequest};
use crate::rack::{utilization, UnitConflict, UtilizationStats};
use crate::report::{self, UnitRow};
use crate::AppState;

use super::{created, ApiError};

/// Rack header for list views: identity plus fill statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RackSummary {
    pub id: String,
    pub name: String,
    pub height: i64,
    pub device_count: usize,
    pub utilization: UtilizationStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Printable layout for one rack: unit rows top-down, plus any
/// occupancy conflicts observed while building the map
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RackLayoutResponse {
    pub rack_id: String,
    pub rack_name: String,
    pub height: i64,
    pub units: Vec<UnitRow>,
    pub conflicts: Vec<UnitConflict>,
}

fn summarize(state: &AppState, rack: &Rack) -> RackSummary {
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    RackSummary {
        id: rack.id.clone(),
        name: rack.name.clone(),
        height: rack.height,
        device_count: rack.devices.len(),
        utilization: utilization::compute(&unit_map, rack.height, &state.config.utilization),
        created_at: rack.created_at,
        updated_at: rack.updated_at,
    }
}

/// List all racks with their utilization headers
pub async fn list_racks(State(state): State<Arc<AppState>>) -> Json<Vec<RackSummary>> {
    let racks = state.store.list_racks().await;
    let summaries = racks.iter().map(|rack| summarize(&state, rack)).collect();
    Json(summaries)
}

/// Get a single rack with its full device list
pub async fn get_rack(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
) -> Result<Json<Rack>, ApiError> {
    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;
    Ok(Json(rack))
}

/// Create a new rack
pub async fn create_rack(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRackRequest>,
) -> Result<(axum::http::StatusCode, Json<Rack>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if let Some(height) = req.height {
        if height < 1 {
            return Err(ApiError::bad_request("height must be at least 1"));
        }
    }
    let rack = state.store.create_rack(&req).await;
    tracing::info!("Created rack {} ({})", rack.name, rack.id);
    Ok(created(rack))
}

/// Rename or resize a rack
pub async fn update_rack(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
    Json(req): Json<UpdateRackRequest>,
) -> Result<Json<Rack>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if let Some(height) = req.height {
        if height < 1 {
            return Err(ApiError::bad_request("height must be at least 1"));
        }
    }
    let rack = state.store.update_rack(&rack_id, &req).await?;
    Ok(Json(rack))
}

/// Delete a rack and every device it owns
pub async fn delete_rack(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.store.delete_rack(&rack_id).await?;
    tracing::info!("Deleted rack {}", rack_id);
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Printable unit-by-unit layout, top of the rack first
pub async fn rack_layout(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
) -> Result<Json<RackLayoutResponse>, ApiError> {
    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    if !unit_map.conflicts().is_empty() {
        tracing::warn!(
            "Rack {} has {} overlapping unit assignment(s)",
            rack.name,
            unit_map.conflicts().len()
        );
    }
    Ok(Json(RackLayoutResponse {
        rack_id: rack.id.clone(),
        rack_name: rack.name.clone(),
        height: rack.height,
        units: report::rack_units(&rack, &unit_map),
        conflicts: unit_map.conflicts().to_vec(),
    }))
}

/// Fill statistics for one rack
pub async fn rack_utilization(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
) -> Result<Json<UtilizationStats>, ApiError> {
    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    Ok(Json(utilization::compute(
        &unit_map,
        rack.height,
        &state.config.utilization,
    )))
}
