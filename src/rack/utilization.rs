use serde::Serialize;

use super::UnitMap;

/// Alert tier for a rack's fill level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationStatus {
    Low,
    Moderate,
    Warning,
    Critical,
}

/// Percentage cutoffs, each inclusive ("≥"). Policy, not data: loaded from
/// configuration so deployments can tune alert levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilizationThresholds {
    pub critical: i64,
    pub warning: i64,
    pub moderate: i64,
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self { critical: 90, warning: 75, moderate: 50 }
    }
}

impl UtilizationThresholds {
    /// First matching tier wins, evaluated highest first
    pub fn classify(&self, percentage: i64) -> UtilizationStatus {
        if percentage >= self.critical {
            UtilizationStatus::Critical
        } else if percentage >= self.warning {
            UtilizationStatus::Warning
        } else if percentage >= self.moderate {
            UtilizationStatus::Moderate
        } else {
            UtilizationStatus::Low
        }
    }
}

/// Fill statistics for one rack, driving header badges and percentage bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationStats {
    pub occupied: i64,
    pub total: i64,
    pub available: i64,
    pub percentage: i64,
    pub status: UtilizationStatus,
}

/// Derive utilization from an already-built unit map
pub fn compute(
    unit_map: &UnitMap,
    rack_height: i64,
    thresholds: &UtilizationThresholds,
) -> UtilizationStats {
    let total = rack_height.max(0);
    let occupied = unit_map.occupied_units().min(total);
    let available = total - occupied;
    let percentage = if total == 0 {
        0
    } else {
        ((occupied as f64 / total as f64) * 100.0).round() as i64
    };

    UtilizationStats {
        occupied,
        total,
        available,
        percentage,
        status: thresholds.classify(percentage),
    }
}
