use serde::Serialize;

use super::UnitMap;
use crate::models::Device;
use crate::registry::TypeRegistry;

/// Outcome of a pre-commit placement check. Returned as data, never thrown;
/// the caller decides whether to block the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a candidate device against the rack's current occupancy.
///
/// Messages accumulate rather than short-circuiting so a form can show
/// every problem at once. Units already claimed by the candidate's own id
/// are ignored, which makes the same call work for adds and for moves.
/// Span-convention breaches for known types are warnings only.
pub fn validate(
    candidate: &Device,
    unit_map: &UnitMap,
    rack_height: i64,
    registry: &TypeRegistry,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if candidate.start_unit.is_none() {
        errors.push("start unit is required".to_string());
    }
    if let Some(start) = candidate.start_unit {
        if start < 1 || start > rack_height {
            errors.push(format!(
                "start unit {} is outside the rack (1-{})",
                start, rack_height
            ));
        }
    }
    if let Some(span) = candidate.unit_span {
        if span < 1 {
            errors.push(format!("unit span must be at least 1, got {}", span));
        }
    }

    let span = candidate.span();
    if let Some(start) = candidate.start_unit {
        let bottom = start - span + 1;
        if bottom < 1 {
            errors.push(format!(
                "device extends below unit 1 (bottom unit would be {})",
                bottom
            ));
        }
        for unit in bottom.max(1)..=start.min(rack_height) {
            if let Some(slot) = unit_map.get(unit) {
                if slot.device.id != candidate.id {
                    errors.push(format!(
                        "unit {} is already occupied by {}",
                        unit, slot.device.name
                    ));
                }
            }
        }
    }

    if let Some(spec) = registry.spec(candidate.kind()) {
        if span > spec.max_span {
            warnings.push(format!(
                "{} devices rarely exceed {}U (requested {}U)",
                spec.label, spec.max_span, span
            ));
        }
    }

    let is_valid = errors.is_empty();
    ValidationResult { is_valid, errors, warnings }
}
