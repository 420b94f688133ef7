use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use ecycle_types::Address;

use crate::error::{IdentityError, IdentityResult};

/// One external-id → wallet binding, including the wallet's secret key.
///
/// The secret never reaches ledger state; it is held so the orchestrator can
/// re-install the signing key after a restart. `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub external_id: String,
    pub address: Address,
    #[serde(with = "secret_serde")]
    pub secret_key: [u8; 32],
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("external_id", &self.external_id)
            .field("address", &self.address)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Persistence boundary for the external-id → wallet map.
///
/// Implementations must be idempotent on `put` (re-writing the same binding
/// is a no-op) and must never lose a binding that `put` reported as stored.
pub trait BindingStore: Send + Sync {
    /// Look up a binding by external id.
    fn get(&self, external_id: &str) -> IdentityResult<Option<Binding>>;

    /// Store a binding, overwriting any previous entry for the same id.
    fn put(&self, binding: &Binding) -> IdentityResult<()>;

    /// All stored bindings, in unspecified order.
    fn list(&self) -> IdentityResult<Vec<Binding>>;
}

/// Volatile binding store for tests and embedding.
#[derive(Default)]
pub struct InMemoryBindingStore {
    bindings: RwLock<HashMap<String, Binding>>,
}

impl InMemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for InMemoryBindingStore {
    fn get(&self, external_id: &str) -> IdentityResult<Option<Binding>> {
        let bindings = self.bindings.read().map_err(|_| IdentityError::LockPoisoned)?;
        Ok(bindings.get(external_id).cloned())
    }

    fn put(&self, binding: &Binding) -> IdentityResult<()> {
        let mut bindings = self
            .bindings
            .write()
            .map_err(|_| IdentityError::LockPoisoned)?;
        bindings.insert(binding.external_id.clone(), binding.clone());
        Ok(())
    }

    fn list(&self) -> IdentityResult<Vec<Binding>> {
        let bindings = self.bindings.read().map_err(|_| IdentityError::LockPoisoned)?;
        Ok(bindings.values().cloned().collect())
    }
}

mod secret_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(secret))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32-byte secret"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(id: &str, seed: u8) -> Binding {
        Binding {
            external_id: id.to_string(),
            address: Address::from_raw([seed; 20]),
            secret_key: [seed; 32],
        }
    }

    #[test]
    fn put_then_get() {
        let store = InMemoryBindingStore::new();
        store.put(&binding("tg:1001", 1)).unwrap();
        let found = store.get("tg:1001").unwrap().unwrap();
        assert_eq!(found.address, Address::from_raw([1; 20]));
        assert!(store.get("tg:9999").unwrap().is_none());
    }

    #[test]
    fn put_overwrites() {
        let store = InMemoryBindingStore::new();
        store.put(&binding("tg:1001", 1)).unwrap();
        store.put(&binding("tg:1001", 2)).unwrap();
        let found = store.get("tg:1001").unwrap().unwrap();
        assert_eq!(found.address, Address::from_raw([2; 20]));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn list_returns_all() {
        let store = InMemoryBindingStore::new();
        store.put(&binding("tg:1", 1)).unwrap();
        store.put(&binding("tg:2", 2)).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn binding_serde_roundtrip_hexes_the_secret() {
        let b = binding("tg:5", 5);
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains(&hex::encode([5u8; 32])));
        let parsed: Binding = serde_json::from_str(&json).unwrap();
        assert_eq!(b, parsed);
    }

    #[test]
    fn debug_redacts_the_secret() {
        let b = binding("tg:5", 5);
        let debug = format!("{b:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex::encode([5u8; 32])));
    }
}
