use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Device;

/// Occupancy record for a single rack unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSlot {
    pub device: Device,
    // True on the device's topmost unit (its label position)
    pub is_first: bool,
    // True on the device's bottom unit
    pub is_last: bool,
    pub offset_from_start: i64,
    pub total_span: i64,
}

/// A contested unit: the later device kept it, the earlier one lost it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConflict {
    pub unit: i64,
    pub winner_id: String,
    pub loser_id: String,
}

/// Derived per-unit occupancy index for one rack. Transient: recomputed
/// whenever the device list or height changes, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMap {
    height: i64,
    slots: BTreeMap<i64, UnitSlot>,
    conflicts: Vec<UnitConflict>,
}

impl UnitMap {
    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn get(&self, unit: i64) -> Option<&UnitSlot> {
        self.slots.get(&unit)
    }

    pub fn is_free(&self, unit: i64) -> bool {
        !self.slots.contains_key(&unit)
    }

    pub fn occupied_units(&self) -> i64 {
        self.slots.len() as i64
    }

    /// Overwrites observed while building; empty for a clean rack
    pub fn conflicts(&self) -> &[UnitConflict] {
        &self.conflicts
    }
}

/// Assign every occupied unit to the device that claims it.
///
/// Devices with a missing or sub-1 start unit are skipped entirely; units
/// falling outside [1, height] are clipped without comment. Occupancy is
/// top-down: a device at `startUnit` with span N claims `startUnit` down to
/// `startUnit - N + 1`. When two devices contest a unit the later one in
/// iteration order keeps it and the overwrite is recorded as a conflict.
pub fn build(devices: &[Device], rack_height: i64) -> UnitMap {
    let height = rack_height.max(0);
    let mut slots: BTreeMap<i64, UnitSlot> = BTreeMap::new();
    let mut conflicts = Vec::new();

    for device in devices {
        let Some(start) = device.start_unit else {
            continue;
        };
        if start < 1 {
            continue;
        }
        let span = device.span();
        let bottom = start - span + 1;

        for unit in bottom..=start {
            if unit < 1 || unit > height {
                continue;
            }
            let slot = UnitSlot {
                device: device.clone(),
                is_first: unit == start,
                is_last: unit == bottom,
                offset_from_start: start - unit,
                total_span: span,
            };
            if let Some(previous) = slots.insert(unit, slot) {
                if previous.device.id != device.id {
                    conflicts.push(UnitConflict {
                        unit,
                        winner_id: device.id.clone(),
                        loser_id: previous.device.id,
                    });
                }
            }
        }
    }

    UnitMap { height, slots, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, start: Option<i64>, span: Option<i64>) -> Device {
        Device {
            id: id.to_string(),
            name: format!("dev-{}", id),
            device_type: "server".to_string(),
            start_unit: start,
            unit_span: span,
            status: None,
            power_connections: Vec::new(),
            port_count: None,
        }
    }

    #[test]
    fn test_spans_downward_from_start() {
        // 42U rack, device at unit 40 spanning 2 occupies 40 and 39
        let devices = vec![device("a", Some(40), Some(2))];
        let map = build(&devices, 42);

        assert_eq!(map.occupied_units(), 2);
        let top = map.get(40).unwrap();
        assert!(top.is_first);
        assert!(!top.is_last);
        assert_eq!(top.offset_from_start, 0);
        assert_eq!(top.total_span, 2);

        let bottom = map.get(39).unwrap();
        assert!(!bottom.is_first);
        assert!(bottom.is_last);
        assert_eq!(bottom.offset_from_start, 1);
        assert!(map.is_free(41));
        assert!(map.is_free(38));
    }

    #[test]
    fn test_every_unit_in_range_maps_to_device() {
        let devices = vec![device("a", Some(10), Some(4))];
        let map = build(&devices, 42);
        for unit in 7..=10 {
            assert_eq!(map.get(unit).unwrap().device.id, "a");
        }
    }

    #[test]
    fn test_clips_out_of_range_units() {
        // Bottom units below 1 are dropped, not reported
        let devices = vec![device("a", Some(3), Some(5))];
        let map = build(&devices, 42);
        assert_eq!(map.occupied_units(), 3);
        assert!(map.get(1).is_some());
        assert!(map.get(3).is_some());

        // Start above the rack top: only in-range units materialize
        let devices = vec![device("b", Some(44), Some(4))];
        let map = build(&devices, 42);
        assert_eq!(map.occupied_units(), 2);
        assert!(map.get(42).is_some());
        assert!(map.get(41).is_some());
    }

    #[test]
    fn test_skips_invalid_start_units() {
        let devices = vec![
            device("a", None, Some(2)),
            device("b", Some(0), Some(2)),
            device("c", Some(-3), None),
        ];
        let map = build(&devices, 42);
        assert_eq!(map.occupied_units(), 0);
    }

    #[test]
    fn test_span_floor_of_one() {
        let devices = vec![device("a", Some(5), Some(0)), device("b", Some(7), None)];
        let map = build(&devices, 42);
        assert_eq!(map.get(5).unwrap().total_span, 1);
        assert_eq!(map.get(7).unwrap().total_span, 1);
    }

    #[test]
    fn test_later_device_wins_and_conflict_is_recorded() {
        let devices = vec![device("a", Some(10), Some(3)), device("b", Some(9), Some(1))];
        let map = build(&devices, 42);

        assert_eq!(map.get(9).unwrap().device.id, "b");
        assert_eq!(map.get(10).unwrap().device.id, "a");
        assert_eq!(map.get(8).unwrap().device.id, "a");

        assert_eq!(map.conflicts().len(), 1);
        let conflict = &map.conflicts()[0];
        assert_eq!(conflict.unit, 9);
        assert_eq!(conflict.winner_id, "b");
        assert_eq!(conflict.loser_id, "a");
    }

    #[test]
    fn test_occupied_never_exceeds_height() {
        let devices: Vec<Device> = (0..10)
            .map(|i| device(&format!("d{}", i), Some(i + 1), Some(3)))
            .collect();
        let map = build(&devices, 5);
        assert!(map.occupied_units() <= 5);
    }

    #[test]
    fn test_build_is_idempotent() {
        let devices = vec![
            device("a", Some(40), Some(2)),
            device("b", Some(10), Some(4)),
            device("c", Some(10), Some(1)),
        ];
        assert_eq!(build(&devices, 42), build(&devices, 42));
    }
}
