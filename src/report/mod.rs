use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Device, Rack};
use crate::power::PowerTopology;
use crate::rack::{self, UnitMap};

/// One row of a source's printed port table. The detail panel and the PDF
/// exporter consume this exact shape; neither re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRow {
    pub port: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Port table plus header fields for one power source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub source_id: String,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_name: Option<String>,
    pub total_ports: i64,
    pub used_ports: i64,
    pub rows: Vec<PortRow>,
}

/// One row of the printable unit-by-unit rack table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRow {
    pub unit: i64,
    // Print row: unit `height` is row 1
    pub row: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    pub is_first: bool,
    pub is_last: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<i64>,
}

/// Human-readable position of a device within its rack: "U40", "U39-U40"
pub fn position_label(device: &Device) -> Option<String> {
    let start = device.start_unit.filter(|s| *s >= 1)?;
    let bottom = (start - device.span() + 1).max(1);
    if bottom == start {
        Some(format!("U{}", start))
    } else {
        Some(format!("U{}-U{}", bottom, start))
    }
}

/// Per-source port tables enriched with each consumer's rack and position.
/// Racks supply the device -> rack lookup; the topology supplies the wiring.
pub fn power_report(racks: &[Rack], topology: &PowerTopology) -> Vec<SourceReport> {
    let mut index: HashMap<&str, (&str, &Device)> = HashMap::new();
    for rack in racks {
        for device in &rack.devices {
            index.insert(device.id.as_str(), (rack.name.as_str(), device));
        }
    }

    topology
        .sources
        .iter()
        .map(|source| {
            let rack_name = index
                .get(source.source_id.as_str())
                .map(|(rack_name, _)| rack_name.to_string());
            let rows = source
                .ports
                .iter()
                .map(|entry| {
                    let consumer = entry
                        .consumer_id
                        .as_deref()
                        .and_then(|id| index.get(id));
                    PortRow {
                        port: entry.port,
                        connected_device_name: consumer.map(|(_, d)| d.name.clone()),
                        rack_name: consumer.map(|(rack_name, _)| rack_name.to_string()),
                        position: consumer.and_then(|(_, d)| position_label(d)),
                    }
                })
                .collect();
            SourceReport {
                source_id: source.source_id.clone(),
                source_name: source.source_name.clone(),
                rack_name,
                total_ports: source.total_ports,
                used_ports: source.used_ports,
                rows,
            }
        })
        .collect()
}

/// Unit-by-unit table for one rack in print order, top of the rack first
pub fn rack_units(rack: &Rack, unit_map: &UnitMap) -> Vec<UnitRow> {
    rack::unit_labels(rack.height)
        .into_iter()
        .map(|unit| {
            let row = rack::display_row(rack.height, unit);
            match unit_map.get(unit) {
                Some(slot) => UnitRow {
                    unit,
                    row,
                    device_id: Some(slot.device.id.clone()),
                    device_name: Some(slot.device.name.clone()),
                    device_type: Some(slot.device.device_type.clone()),
                    is_first: slot.is_first,
                    is_last: slot.is_last,
                    span: Some(slot.total_span),
                },
                None => UnitRow {
                    unit,
                    row,
                    device_id: None,
                    device_name: None,
                    device_type: None,
                    is_first: false,
                    is_last: false,
                    span: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PowerConnection;
    use crate::power;
    use crate::rack::unit_map;
    use chrono::Utc;

    fn device(id: &str, name: &str, kind: &str, start: i64, span: i64) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
            device_type: kind.to_string(),
            start_unit: Some(start),
            unit_span: Some(span),
            status: None,
            power_connections: Vec::new(),
            port_count: None,
        }
    }

    fn rack(id: &str, name: &str, height: i64, devices: Vec<Device>) -> Rack {
        let now = Utc::now();
        Rack {
            id: id.to_string(),
            name: name.to_string(),
            height,
            devices,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_position_label() {
        assert_eq!(position_label(&device("a", "x", "server", 40, 2)).unwrap(), "U39-U40");
        assert_eq!(position_label(&device("a", "x", "server", 12, 1)).unwrap(), "U12");
        let mut unplaced = device("a", "x", "server", 1, 1);
        unplaced.start_unit = None;
        assert!(position_label(&unplaced).is_none());
    }

    #[test]
    fn test_power_report_rows() {
        let mut pdu = device("pdu-1", "PDU-A1", "pdu", 45, 1);
        pdu.port_count = Some(8);
        let mut switch = device("sw-1", "core-sw-01", "switch", 40, 2);
        switch.power_connections.push(PowerConnection {
            source_id: "pdu-1".to_string(),
            port: Some(3),
            voltage: Some("230V".to_string()),
        });
        let racks = vec![rack("r1", "Row A / Rack 1", 45, vec![pdu, switch])];

        let devices: Vec<Device> = racks.iter().flat_map(|r| r.devices.clone()).collect();
        let topology = power::resolve(&devices);
        let reports = power_report(&racks, &topology);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.source_name, "PDU-A1");
        assert_eq!(report.rack_name.as_deref(), Some("Row A / Rack 1"));
        assert_eq!(report.rows.len(), 8);

        let row = &report.rows[2];
        assert_eq!(row.port, 3);
        assert_eq!(row.connected_device_name.as_deref(), Some("core-sw-01"));
        assert_eq!(row.rack_name.as_deref(), Some("Row A / Rack 1"));
        assert_eq!(row.position.as_deref(), Some("U39-U40"));

        let empty = &report.rows[0];
        assert!(empty.connected_device_name.is_none());
        assert!(empty.position.is_none());
    }

    #[test]
    fn test_power_report_crosses_racks() {
        let mut pdu = device("pdu-1", "PDU-A1", "pdu", 45, 1);
        pdu.port_count = Some(8);
        let mut server = device("srv-1", "db-01", "server", 20, 2);
        server.power_connections.push(PowerConnection {
            source_id: "pdu-1".to_string(),
            port: Some(1),
            voltage: None,
        });
        let racks = vec![
            rack("r1", "Rack 1", 45, vec![pdu]),
            rack("r2", "Rack 2", 45, vec![server]),
        ];

        let devices: Vec<Device> = racks.iter().flat_map(|r| r.devices.clone()).collect();
        let reports = power_report(&racks, &power::resolve(&devices));
        assert_eq!(reports[0].rows[0].rack_name.as_deref(), Some("Rack 2"));
    }

    #[test]
    fn test_rack_units_print_order() {
        let r = rack("r1", "Rack 1", 5, vec![device("a", "web-01", "server", 4, 2)]);
        let map = unit_map::build(&r.devices, r.height);
        let rows = rack_units(&r, &map);

        assert_eq!(rows.iter().map(|r| r.unit).collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(rows[0].device_name.is_none());
        assert_eq!(rows[1].device_name.as_deref(), Some("web-01"));
        assert!(rows[1].is_first);
        assert_eq!(rows[2].device_name.as_deref(), Some("web-01"));
        assert!(rows[2].is_last);
        assert!(rows[3].device_name.is_none());
    }
}
