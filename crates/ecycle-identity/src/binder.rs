use std::sync::Arc;

use tracing::{debug, info};

use ecycle_crypto::SigningKey;
use ecycle_relay::{Faucet, Relay};
use ecycle_types::Address;

use crate::error::IdentityResult;
use crate::store::{Binding, BindingStore};

/// Resolves external identities to ledger accounts, creating wallets lazily.
///
/// Resolution is idempotent: the first call for an id generates a keypair,
/// persists the binding, installs the key in the relay's keystore, and runs
/// the gas-prefunding prerequisite; every later call (including after a
/// restart) returns the same address and re-installs the key if the keystore
/// lost it.
pub struct IdentityBinder {
    store: Arc<dyn BindingStore>,
    relay: Arc<Relay>,
    faucet: Arc<Faucet>,
}

impl IdentityBinder {
    pub fn new(store: Arc<dyn BindingStore>, relay: Arc<Relay>, faucet: Arc<Faucet>) -> Self {
        Self {
            store,
            relay,
            faucet,
        }
    }

    /// Resolve `external_id` to its ledger account, creating and funding a
    /// wallet on first contact.
    pub async fn resolve_or_create(&self, external_id: &str) -> IdentityResult<Address> {
        if let Some(binding) = self.store.get(external_id)? {
            // Re-install the key after a restart; the binding is permanent.
            if !self.relay.keystore().contains(binding.address) {
                self.relay
                    .keystore()
                    .insert(SigningKey::from_bytes(binding.secret_key));
                debug!(
                    external_id,
                    address = %binding.address.short(),
                    "signing key restored from binding"
                );
            }
            return Ok(binding.address);
        }

        let key = SigningKey::generate();
        let address = key.address();
        let binding = Binding {
            external_id: external_id.to_string(),
            address,
            secret_key: *key.as_bytes(),
        };
        // Persist before funding: a crash between the two leaves a valid
        // binding whose wallet gets funded on the next resolve-and-submit.
        self.store.put(&binding)?;
        self.relay.keystore().insert(key);

        self.faucet.ensure_funded(address).await?;
        info!(external_id, address = %address.short(), "wallet created and funded");
        Ok(address)
    }

    /// Look up an existing binding without creating one.
    pub fn resolve(&self, external_id: &str) -> IdentityResult<Option<Address>> {
        Ok(self.store.get(external_id)?.map(|b| b.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ecycle_chain::{ChainConfig, GenesisConfig, InMemoryChain};
    use ecycle_relay::{Keystore, RelayConfig};

    use crate::store::InMemoryBindingStore;

    fn rig() -> (Arc<InMemoryChain>, IdentityBinder, Arc<Relay>) {
        let keystore = Arc::new(Keystore::new());
        let funder = keystore.generate();
        let genesis = GenesisConfig::new(Address::from_raw([0xee; 20]))
            .with_native_balance(funder, 1_000_000);
        let chain = Arc::new(InMemoryChain::new(
            genesis,
            ChainConfig {
                block_interval: Duration::from_millis(10),
                ..ChainConfig::default()
            },
        ));
        let relay = Arc::new(Relay::new(
            chain.clone(),
            keystore,
            RelayConfig {
                poll_interval: Duration::from_millis(5),
                confirm_timeout: Duration::from_millis(500),
                ..RelayConfig::default()
            },
        ));
        let faucet = Arc::new(Faucet::new(relay.clone(), funder));
        let binder = IdentityBinder::new(
            Arc::new(InMemoryBindingStore::new()),
            relay.clone(),
            faucet,
        );
        (chain, binder, relay)
    }

    #[tokio::test]
    async fn first_contact_creates_and_funds_a_wallet() {
        let (chain, binder, relay) = rig();
        let sealer = chain.spawn_sealer();

        let address = binder.resolve_or_create("tg:1001").await.unwrap();
        sealer.abort();

        assert!(relay.keystore().contains(address));
        assert_eq!(
            relay.native_balance(address).await.unwrap(),
            relay.config().funding_amount
        );
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let (chain, binder, relay) = rig();
        let sealer = chain.spawn_sealer();

        let first = binder.resolve_or_create("tg:1001").await.unwrap();
        let second = binder.resolve_or_create("tg:1001").await.unwrap();
        sealer.abort();

        assert_eq!(first, second);
        // Idempotent funding too: balance was topped up exactly once.
        assert_eq!(
            relay.native_balance(first).await.unwrap(),
            relay.config().funding_amount
        );
    }

    #[tokio::test]
    async fn different_ids_get_different_wallets() {
        let (chain, binder, _relay) = rig();
        let sealer = chain.spawn_sealer();

        let a = binder.resolve_or_create("tg:1").await.unwrap();
        let b = binder.resolve_or_create("tg:2").await.unwrap();
        sealer.abort();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn resolve_does_not_create() {
        let (_chain, binder, _relay) = rig();
        assert!(binder.resolve("tg:unseen").unwrap().is_none());
    }

    #[tokio::test]
    async fn key_is_reinstalled_from_a_persisted_binding() {
        let (chain, binder, relay) = rig();
        let sealer = chain.spawn_sealer();
        let address = binder.resolve_or_create("tg:1001").await.unwrap();

        // Simulate a restart by wiring a fresh keystore/relay to the same
        // store contents.
        let store = Arc::new(InMemoryBindingStore::new());
        for b in binder.store.list().unwrap() {
            store.put(&b).unwrap();
        }
        let keystore = Arc::new(Keystore::new());
        let funder = keystore.generate();
        let relay2 = Arc::new(Relay::new(
            chain.clone(),
            keystore,
            relay.config().clone(),
        ));
        let faucet2 = Arc::new(Faucet::new(relay2.clone(), funder));
        let binder2 = IdentityBinder::new(store, relay2.clone(), faucet2);

        let resolved = binder2.resolve_or_create("tg:1001").await.unwrap();
        sealer.abort();

        assert_eq!(resolved, address);
        assert!(relay2.keystore().contains(address));
    }
}
