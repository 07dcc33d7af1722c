use std::collections::HashMap;

use crate::models::DeviceKind;

/// Display and span policy for one device kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub label: &'static str,
    pub default_span: i64,
    // Advisory ceiling; the validator warns above it but never blocks
    pub max_span: i64,
}

/// Lookup from device kind to its display/semantic metadata.
/// Built once with a default policy and injected into the validator;
/// deployments can override entries without touching the algorithms.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    specs: HashMap<DeviceKind, TypeSpec>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut specs = HashMap::new();
        specs.insert(DeviceKind::Server, TypeSpec { label: "Server", default_span: 1, max_span: 4 });
        specs.insert(DeviceKind::Switch, TypeSpec { label: "Switch", default_span: 1, max_span: 2 });
        specs.insert(DeviceKind::Router, TypeSpec { label: "Router", default_span: 1, max_span: 2 });
        specs.insert(DeviceKind::Firewall, TypeSpec { label: "Firewall", default_span: 1, max_span: 2 });
        specs.insert(DeviceKind::PatchPanel, TypeSpec { label: "Patch panel", default_span: 1, max_span: 2 });
        specs.insert(DeviceKind::Storage, TypeSpec { label: "Storage", default_span: 2, max_span: 4 });
        specs.insert(DeviceKind::Kvm, TypeSpec { label: "KVM", default_span: 1, max_span: 1 });
        specs.insert(DeviceKind::Pdu, TypeSpec { label: "PDU", default_span: 1, max_span: 2 });
        specs.insert(DeviceKind::Ups, TypeSpec { label: "UPS", default_span: 2, max_span: 6 });
        // DeviceKind::Other carries no spec: unknown types never trigger span warnings
        Self { specs }
    }
}

impl TypeRegistry {
    /// Override or add the spec for one kind
    pub fn with_spec(mut self, kind: DeviceKind, spec: TypeSpec) -> Self {
        self.specs.insert(kind, spec);
        self
    }

    pub fn spec(&self, kind: DeviceKind) -> Option<&TypeSpec> {
        self.specs.get(&kind)
    }

    /// Registered kinds with their specs, in display order
    pub fn entries(&self) -> Vec<(DeviceKind, TypeSpec)> {
        DISPLAY_ORDER
            .iter()
            .filter_map(|kind| self.specs.get(kind).map(|spec| (*kind, *spec)))
            .collect()
    }
}

const DISPLAY_ORDER: [DeviceKind; 9] = [
    DeviceKind::Server,
    DeviceKind::Switch,
    DeviceKind::Router,
    DeviceKind::Firewall,
    DeviceKind::PatchPanel,
    DeviceKind::Storage,
    DeviceKind::Kvm,
    DeviceKind::Pdu,
    DeviceKind::Ups,
];
