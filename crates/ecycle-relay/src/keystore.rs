use std::collections::HashMap;
use std::sync::RwLock;

use ecycle_chain::{SignedTransaction, Transaction};
use ecycle_crypto::SigningKey;
use ecycle_types::Address;

use crate::error::{RelayError, RelayResult};

/// In-memory account keys held by the orchestrator.
///
/// Keys never appear in ledger state; the ledger only ever sees addresses
/// and signatures. Secrets are redacted from `Debug` output by the
/// underlying [`SigningKey`].
#[derive(Default)]
pub struct Keystore {
    keys: RwLock<HashMap<Address, SigningKey>>,
}

impl Keystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh account key and return its address.
    pub fn generate(&self) -> Address {
        self.insert(SigningKey::generate())
    }

    /// Install an existing key, returning the address it controls.
    pub fn insert(&self, key: SigningKey) -> Address {
        let address = key.address();
        self.keys
            .write()
            .expect("keystore lock poisoned")
            .insert(address, key);
        address
    }

    /// Whether a key for `address` is held.
    pub fn contains(&self, address: Address) -> bool {
        self.keys
            .read()
            .expect("keystore lock poisoned")
            .contains_key(&address)
    }

    /// Addresses of all held keys.
    pub fn addresses(&self) -> Vec<Address> {
        self.keys
            .read()
            .expect("keystore lock poisoned")
            .keys()
            .copied()
            .collect()
    }

    /// Sign a transaction with the key controlling `tx.sender`.
    pub fn sign(&self, tx: Transaction) -> RelayResult<SignedTransaction> {
        let keys = self.keys.read().expect("keystore lock poisoned");
        let key = keys
            .get(&tx.sender)
            .ok_or(RelayError::UnknownAccount(tx.sender))?;
        Ok(SignedTransaction::sign(tx, key)?)
    }
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.keys.read().map(|k| k.len()).unwrap_or(0);
        write!(f, "Keystore({count} keys)")
    }
}
