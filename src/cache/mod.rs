use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::models::Device;
use crate::power::{self, PowerTopology};
use crate::rack::{unit_map, UnitMap};

/// Memoized derived views, keyed by a fingerprint of their inputs.
///
/// Both underlying functions are pure, so this is purely an optimization
/// for the render-every-request calling pattern; a miss or a poisoned lock
/// just means computing fresh.
pub struct LayoutCache {
    unit_maps: Mutex<LruCache<u64, Arc<UnitMap>>>,
    topologies: Mutex<LruCache<u64, Arc<PowerTopology>>>,
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            unit_maps: Mutex::new(LruCache::new(capacity)),
            topologies: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Memoized unit map for one rack's device list
    pub fn unit_map(&self, devices: &[Device], rack_height: i64) -> Arc<UnitMap> {
        let key = fingerprint(devices, Some(rack_height));
        if let Ok(mut cache) = self.unit_maps.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
            let built = Arc::new(unit_map::build(devices, rack_height));
            cache.put(key, built.clone());
            return built;
        }
        Arc::new(unit_map::build(devices, rack_height))
    }

    /// Memoized power topology for the cross-rack device set
    pub fn topology(&self, devices: &[Device]) -> Arc<PowerTopology> {
        let key = fingerprint(devices, None);
        if let Ok(mut cache) = self.topologies.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
            let resolved = Arc::new(power::resolve(devices));
            cache.put(key, resolved.clone());
            return resolved;
        }
        Arc::new(power::resolve(devices))
    }
}

fn fingerprint(devices: &[Device], rack_height: Option<i64>) -> u64 {
    let mut hasher = DefaultHasher::new();
    rack_height.hash(&mut hasher);
    devices.hash(&mut hasher);
    hasher.finish()
}
