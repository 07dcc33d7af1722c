use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{Device, DeviceKind};

/// Ports assumed for a source nothing references yet
pub const FALLBACK_PORTS: i64 = 8;

// Off-the-shelf PDU outlet counts; capacity snaps up to the nearest
const PDU_STANDARD_SIZES: [i64; 4] = [8, 16, 24, 48];

/// One numbered outlet on a power source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortEntry {
    pub port: i64,
    pub is_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

/// Resolved port table for one PDU/UPS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePorts {
    pub source_id: String,
    pub source_name: String,
    pub kind: DeviceKind,
    pub total_ports: i64,
    pub used_ports: i64,
    pub ports: Vec<PortEntry>,
}

/// A consumer's resolved claim on one source port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerFeed {
    pub source_id: String,
    pub port: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
}

/// A port claimed by more than one consumer. Real outlets feed one device;
/// this is almost certainly a data-entry mistake worth showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortConflict {
    pub source_id: String,
    pub port: i64,
    pub consumer_ids: Vec<String>,
}

/// The resolved many-to-many relationship between source ports and the
/// consumers bound to them. Derived from the full cross-rack device set;
/// recomputed on demand, holds no state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PowerTopology {
    // Sources in device-list order
    pub sources: Vec<SourcePorts>,
    // Consumer id -> every (source, port) pair it declares
    pub feeds: BTreeMap<String, Vec<PowerFeed>>,
    pub conflicts: Vec<PortConflict>,
}

impl PowerTopology {
    pub fn source(&self, source_id: &str) -> Option<&SourcePorts> {
        self.sources.iter().find(|s| s.source_id == source_id)
    }

    pub fn feeds_for(&self, consumer_id: &str) -> &[PowerFeed] {
        self.feeds.get(consumer_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the power topology for the full device set, across racks.
///
/// PDU and UPS devices are sources; everything else consumes. Only consumer
/// connections populate port tables, and connections with a missing or
/// sub-1 port number are ignored. The single source of truth for every
/// caller that renders or prints power structure.
pub fn resolve(devices: &[Device]) -> PowerTopology {
    let mut sources: Vec<&Device> = Vec::new();
    let mut consumers: Vec<&Device> = Vec::new();
    for device in devices {
        if device.kind().is_power_source() {
            sources.push(device);
        } else {
            consumers.push(device);
        }
    }

    // Per source: port -> claimant ids in consumer-list order
    let mut claims: HashMap<&str, BTreeMap<i64, Vec<&str>>> = HashMap::new();
    let mut feeds: BTreeMap<String, Vec<PowerFeed>> = BTreeMap::new();

    for consumer in &consumers {
        for connection in &consumer.power_connections {
            let Some(port) = connection.port else {
                continue;
            };
            if port < 1 {
                continue;
            }
            feeds.entry(consumer.id.clone()).or_default().push(PowerFeed {
                source_id: connection.source_id.clone(),
                port,
                voltage: connection.voltage.clone(),
            });
            claims
                .entry(connection.source_id.as_str())
                .or_default()
                .entry(port)
                .or_default()
                .push(consumer.id.as_str());
        }
    }

    let mut resolved = Vec::with_capacity(sources.len());
    let mut conflicts = Vec::new();

    for source in &sources {
        let ports_claimed = claims.get(source.id.as_str());
        let highest_used = ports_claimed
            .and_then(|ports| ports.keys().next_back().copied())
            .unwrap_or(0);
        let total_ports = resolved_capacity(source, highest_used);

        let mut ports = Vec::with_capacity(total_ports.max(0) as usize);
        let mut used_ports = 0;
        for port in 1..=total_ports {
            match ports_claimed.and_then(|p| p.get(&port)) {
                Some(claimants) if !claimants.is_empty() => {
                    used_ports += 1;
                    if claimants.len() > 1 {
                        conflicts.push(PortConflict {
                            source_id: source.id.clone(),
                            port,
                            consumer_ids: claimants.iter().map(|id| id.to_string()).collect(),
                        });
                    }
                    ports.push(PortEntry {
                        port,
                        is_used: true,
                        consumer_id: Some(claimants[0].to_string()),
                    });
                }
                _ => ports.push(PortEntry { port, is_used: false, consumer_id: None }),
            }
        }

        resolved.push(SourcePorts {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            kind: source.kind(),
            total_ports,
            used_ports,
            ports,
        });
    }

    PowerTopology { sources: resolved, feeds, conflicts }
}

/// Port capacity for one source, first applicable rule wins:
/// an explicit count on the device, the kind-specific heuristic over the
/// highest referenced port, or the fallback when nothing references it.
/// The result is never below the highest referenced port.
fn resolved_capacity(source: &Device, highest_used: i64) -> i64 {
    if let Some(count) = source.port_count.filter(|c| *c >= 1) {
        return count.max(highest_used);
    }
    if highest_used < 1 {
        return FALLBACK_PORTS;
    }
    match source.kind() {
        // UPS rear panels come in multiples of 4, 8 at minimum
        DeviceKind::Ups => round_up_to_multiple(highest_used, 4).max(8),
        _ => PDU_STANDARD_SIZES
            .iter()
            .copied()
            .find(|size| *size >= highest_used)
            .unwrap_or(highest_used),
    }
}

fn round_up_to_multiple(value: i64, step: i64) -> i64 {
    ((value + step - 1) / step) * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PowerConnection;

    fn source(id: &str, kind: &str, port_count: Option<i64>) -> Device {
        Device {
            id: id.to_string(),
            name: id.to_string(),
            device_type: kind.to_string(),
            start_unit: Some(1),
            unit_span: Some(1),
            status: None,
            power_connections: Vec::new(),
            port_count,
        }
    }

    fn consumer(id: &str, connections: &[(&str, i64)]) -> Device {
        Device {
            id: id.to_string(),
            name: id.to_string(),
            device_type: "server".to_string(),
            start_unit: Some(10),
            unit_span: Some(1),
            status: None,
            power_connections: connections
                .iter()
                .map(|(source_id, port)| PowerConnection {
                    source_id: source_id.to_string(),
                    port: Some(*port),
                    voltage: None,
                })
                .collect(),
            port_count: None,
        }
    }

    #[test]
    fn test_explicit_port_count() {
        // PDU-1 with portCount 8, one consumer on port 3
        let devices = vec![source("PDU-1", "pdu", Some(8)), consumer("Switch-1", &[("PDU-1", 3)])];
        let topology = resolve(&devices);

        let pdu = topology.source("PDU-1").unwrap();
        assert_eq!(pdu.total_ports, 8);
        assert_eq!(pdu.used_ports, 1);
        assert_eq!(pdu.ports.len(), 8);

        let entry = &pdu.ports[2];
        assert_eq!(entry.port, 3);
        assert!(entry.is_used);
        assert_eq!(entry.consumer_id.as_deref(), Some("Switch-1"));
        assert_eq!(pdu.ports.iter().filter(|p| !p.is_used).count(), 7);
    }

    #[test]
    fn test_ups_heuristic_capacity() {
        // No explicit count, consumers on ports 1, 2, 5 -> multiple of 4, floor 8
        let devices = vec![
            source("UPS-1", "ups", None),
            consumer("a", &[("UPS-1", 1)]),
            consumer("b", &[("UPS-1", 2)]),
            consumer("c", &[("UPS-1", 5)]),
        ];
        let topology = resolve(&devices);
        assert_eq!(topology.source("UPS-1").unwrap().total_ports, 8);

        // Port 9 pushes past the floor to the next multiple of 4
        let devices = vec![source("UPS-2", "ups", None), consumer("d", &[("UPS-2", 9)])];
        assert_eq!(resolve(&devices).source("UPS-2").unwrap().total_ports, 12);
    }

    #[test]
    fn test_pdu_snaps_to_standard_sizes() {
        for (highest, expected) in [(1, 8), (8, 8), (9, 16), (17, 24), (30, 48), (48, 48), (60, 60)] {
            let devices = vec![source("PDU-1", "pdu", None), consumer("c", &[("PDU-1", highest)])];
            let topology = resolve(&devices);
            assert_eq!(
                topology.source("PDU-1").unwrap().total_ports,
                expected,
                "highest port {}",
                highest
            );
        }
    }

    #[test]
    fn test_unreferenced_source_gets_fallback() {
        let devices = vec![source("PDU-1", "pdu", None)];
        let topology = resolve(&devices);
        let pdu = topology.source("PDU-1").unwrap();
        assert_eq!(pdu.total_ports, FALLBACK_PORTS);
        assert_eq!(pdu.used_ports, 0);
        assert!(pdu.ports.iter().all(|p| !p.is_used));
    }

    #[test]
    fn test_explicit_count_raised_to_highest_referenced() {
        // totalPorts must stay >= the highest referenced port
        let devices = vec![source("PDU-1", "pdu", Some(4)), consumer("c", &[("PDU-1", 6)])];
        let topology = resolve(&devices);
        let pdu = topology.source("PDU-1").unwrap();
        assert_eq!(pdu.total_ports, 6);
        assert!(pdu.ports[5].is_used);
    }

    #[test]
    fn test_partition_is_case_insensitive() {
        let devices = vec![source("PDU-1", "PDU", None), source("UPS-1", "Ups", None)];
        let topology = resolve(&devices);
        assert_eq!(topology.sources.len(), 2);
    }

    #[test]
    fn test_dual_corded_consumer_reverse_map() {
        let devices = vec![
            source("PDU-A", "pdu", Some(8)),
            source("PDU-B", "pdu", Some(8)),
            consumer("db-01", &[("PDU-A", 1), ("PDU-B", 1)]),
        ];
        let topology = resolve(&devices);

        let feeds = topology.feeds_for("db-01");
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].source_id, "PDU-A");
        assert_eq!(feeds[1].source_id, "PDU-B");
        assert!(topology.source("PDU-A").unwrap().ports[0].is_used);
        assert!(topology.source("PDU-B").unwrap().ports[0].is_used);
    }

    #[test]
    fn test_duplicate_port_claim_is_surfaced() {
        let devices = vec![
            source("PDU-1", "pdu", Some(8)),
            consumer("first", &[("PDU-1", 4)]),
            consumer("second", &[("PDU-1", 4)]),
        ];
        let topology = resolve(&devices);

        // First claimant in input order keeps the table entry
        let entry = &topology.source("PDU-1").unwrap().ports[3];
        assert_eq!(entry.consumer_id.as_deref(), Some("first"));

        assert_eq!(topology.conflicts.len(), 1);
        let conflict = &topology.conflicts[0];
        assert_eq!(conflict.source_id, "PDU-1");
        assert_eq!(conflict.port, 4);
        assert_eq!(conflict.consumer_ids, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_invalid_ports_are_ignored() {
        let mut bad = consumer("c", &[("PDU-1", 2)]);
        bad.power_connections.push(PowerConnection {
            source_id: "PDU-1".to_string(),
            port: None,
            voltage: None,
        });
        bad.power_connections.push(PowerConnection {
            source_id: "PDU-1".to_string(),
            port: Some(0),
            voltage: None,
        });
        let devices = vec![source("PDU-1", "pdu", Some(8)), bad];
        let topology = resolve(&devices);
        assert_eq!(topology.source("PDU-1").unwrap().used_ports, 1);
        assert_eq!(topology.feeds_for("c").len(), 1);
    }

    #[test]
    fn test_unknown_source_id_stays_in_reverse_map_only() {
        let devices = vec![consumer("c", &[("ghost-pdu", 1)])];
        let topology = resolve(&devices);
        assert!(topology.sources.is_empty());
        assert_eq!(topology.feeds_for("c").len(), 1);
        assert_eq!(topology.feeds_for("c")[0].source_id, "ghost-pdu");
    }

    #[test]
    fn test_source_connections_do_not_populate_tables() {
        // A PDU fed by a UPS is a source, not a consumer; its own
        // connections are not scanned
        let mut pdu = source("PDU-1", "pdu", Some(8));
        pdu.power_connections.push(PowerConnection {
            source_id: "UPS-1".to_string(),
            port: Some(1),
            voltage: None,
        });
        let devices = vec![source("UPS-1", "ups", None), pdu];
        let topology = resolve(&devices);
        assert_eq!(topology.source("UPS-1").unwrap().used_ports, 0);
        assert!(topology.feeds_for("PDU-1").is_empty());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let devices = vec![
            source("PDU-1", "pdu", Some(8)),
            source("UPS-1", "ups", None),
            consumer("a", &[("PDU-1", 1), ("UPS-1", 3)]),
            consumer("b", &[("PDU-1", 1)]),
        ];
        assert_eq!(resolve(&devices), resolve(&devices));
    }
}
