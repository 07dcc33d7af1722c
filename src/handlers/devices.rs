use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{device_status, CreateDeviceRequest, Device, DeviceKind, UpdateDeviceRequest};
use crate::rack::{placement, ValidationResult};
use crate::AppState;

use super::{created, ApiError};

/// Span policy for one device kind, for add/edit form presets
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTypeInfo {
    pub kind: DeviceKind,
    pub label: &'static str,
    pub default_span: i64,
    pub max_span: i64,
}

/// List the registered device kinds and their span policies
pub async fn list_device_types(State(state): State<Arc<AppState>>) -> Json<Vec<DeviceTypeInfo>> {
    let entries = state
        .registry
        .entries()
        .into_iter()
        .map(|(kind, spec)| DeviceTypeInfo {
            kind,
            label: spec.label,
            default_span: spec.default_span,
            max_span: spec.max_span,
        })
        .collect();
    Json(entries)
}

/// Committed device plus any advisory warnings from the placement check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommitResponse {
    pub device: Device,
    pub warnings: Vec<String>,
}

/// Dry-run validation request: a candidate device shape, plus the id of the
/// device being edited when this is a move rather than an add
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDeviceRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub device: CreateDeviceRequest,
}

/// List the devices in a rack
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;
    Ok(Json(rack.devices))
}

/// Get a single device
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path((rack_id, device_id)): Path<(String, String)>,
) -> Result<Json<Device>, ApiError> {
    let device = state
        .store
        .get_device(&rack_id, &device_id)
        .await
        .ok_or_else(|| ApiError::not_found("device"))?;
    Ok(Json(device))
}

fn check_common_fields(name: &str, device_type: &str, status: Option<&str>) -> Result<(), ApiError> {
    if name.trim().is_empty() || device_type.trim().is_empty() {
        return Err(ApiError::bad_request("name and type are required"));
    }
    if let Some(status) = status {
        if !device_status::is_valid(status) {
            return Err(ApiError::bad_request(
                "status must be one of: active, offline, maintenance",
            ));
        }
    }
    Ok(())
}

/// Add a device to a rack. The placement check runs pre-commit: blocking
/// errors reject the add, warnings are returned alongside the device.
pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(axum::http::StatusCode, Json<DeviceCommitResponse>), ApiError> {
    check_common_fields(&req.name, &req.device_type, req.status.as_deref())?;

    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;

    let candidate = req.into_device(uuid::Uuid::new_v4().to_string());
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    let result = placement::validate(&candidate, &unit_map, rack.height, &state.registry);
    if !result.is_valid {
        return Err(ApiError::unprocessable(result.errors.join("; ")));
    }
    for warning in &result.warnings {
        tracing::warn!("Placement warning for {}: {}", candidate.name, warning);
    }

    let device = state.store.create_device(&rack_id, candidate).await?;
    tracing::info!("Added device {} to rack {}", device.name, rack.name);
    Ok(created(DeviceCommitResponse { device, warnings: result.warnings }))
}

/// Dry-run placement check for add/edit forms; never mutates anything
pub async fn validate_device(
    State(state): State<Arc<AppState>>,
    Path(rack_id): Path<String>,
    Json(req): Json<ValidateDeviceRequest>,
) -> Result<Json<ValidationResult>, ApiError> {
    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;

    // For an edit, reuse the existing id so the candidate's current units
    // are not reported as conflicts with itself
    let candidate_id = req
        .device_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let candidate = req.device.into_device(candidate_id);
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    Ok(Json(placement::validate(
        &candidate,
        &unit_map,
        rack.height,
        &state.registry,
    )))
}

/// Replace a device's editable fields, re-running the placement check
pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path((rack_id, device_id)): Path<(String, String)>,
    Json(req): Json<UpdateDeviceRequest>,
) -> Result<Json<DeviceCommitResponse>, ApiError> {
    check_common_fields(&req.name, &req.device_type, req.status.as_deref())?;

    let rack = state
        .store
        .get_rack(&rack_id)
        .await
        .ok_or_else(|| ApiError::not_found("rack"))?;
    if !rack.devices.iter().any(|d| d.id == device_id) {
        return Err(ApiError::not_found("device"));
    }

    let candidate = req.into_device(device_id.clone());
    let unit_map = state.layouts.unit_map(&rack.devices, rack.height);
    let result = placement::validate(&candidate, &unit_map, rack.height, &state.registry);
    if !result.is_valid {
        return Err(ApiError::unprocessable(result.errors.join("; ")));
    }
    for warning in &result.warnings {
        tracing::warn!("Placement warning for {}: {}", candidate.name, warning);
    }

    let device = state
        .store
        .update_device(&rack_id, &device_id, candidate)
        .await?;
    Ok(Json(DeviceCommitResponse { device, warnings: result.warnings }))
}

/// Remove a device from its rack
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path((rack_id, device_id)): Path<(String, String)>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.store.delete_device(&rack_id, &device_id).await?;
    tracing::info!("Removed device {} from rack {}", device_id, rack_id);
    Ok(axum::http::StatusCode::NO_CONTENT)
}
