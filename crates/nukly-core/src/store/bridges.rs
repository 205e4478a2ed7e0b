use indexmap::IndexMap;

use crate::model::{Bridge, BridgeId};

/// Known bridges keyed by id, iterated in registration order.
#[derive(Debug, Default)]
pub struct BridgeRegistry {
    bridges: IndexMap<BridgeId, Bridge>,
}

impl BridgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bridge. Re-adding an id replaces the earlier entry.
    pub fn add(&mut self, bridge: Bridge) {
        self.bridges.insert(bridge.id(), bridge);
    }

    pub fn get(&self, id: BridgeId) -> Option<&Bridge> {
        self.bridges.get(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Bridge> {
        self.bridges.values()
    }

    /// Whether some registered bridge lives at `address:port`.
    pub fn contains_endpoint(&self, address: &str, port: u16) -> bool {
        self.bridges.values().any(|b| b.is_at(address, port))
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn bridge(id: u64, address: &str) -> Bridge {
        Bridge::new(BridgeId(id), address, 8080, SecretString::from("k".to_string())).unwrap()
    }

    #[test]
    fn all_preserves_registration_order() {
        let mut registry = BridgeRegistry::new();
        registry.add(bridge(0, "10.0.0.1"));
        registry.add(bridge(99, "10.0.0.2"));
        registry.add(bridge(5, "10.0.0.3"));

        let ids: Vec<u64> = registry.all().map(|b| b.id().0).collect();
        assert_eq!(ids, vec![0, 99, 5]);
    }

    #[test]
    fn add_same_id_replaces() {
        let mut registry = BridgeRegistry::new();
        registry.add(bridge(0, "10.0.0.1"));
        registry.add(bridge(0, "10.0.0.9"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(BridgeId(0)).unwrap().address(), "10.0.0.9");
        assert!(registry.contains_endpoint("10.0.0.9", 8080));
        assert!(!registry.contains_endpoint("10.0.0.1", 8080));
    }
}
