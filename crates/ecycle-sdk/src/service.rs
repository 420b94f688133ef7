use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use ecycle_chain::{
    Call, ChainConfig, GenesisConfig, InMemoryChain, View,
};
use ecycle_identity::{BindingStore, IdentityBinder, InMemoryBindingStore};
use ecycle_ledger::{
    BuyerRecord, ErrandRecord, EwasteRecord, Transition, TransitionEffect,
};
use ecycle_relay::{Faucet, Keystore, Relay, RelayConfig};
use ecycle_types::{Address, Amount, ErrandId, EwasteId};

use crate::error::{ServiceError, ServiceResult};

/// Aggregated per-account figures for the stats query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    pub account: Address,
    pub token_balance: Amount,
    pub native_balance: Amount,
    pub reputation: u64,
    pub recycled_amount: Amount,
}

/// The Ecycle command surface.
///
/// Callers are identified by an external id (chat account, API key — opaque
/// here); every command resolves the caller's wallet through the identity
/// binder, funds it on first contact, and drives the transition through the
/// relay to a confirmed outcome. Owner-only commands run under the operator
/// account supplied at construction.
pub struct EcycleService {
    relay: Arc<Relay>,
    binder: IdentityBinder,
    operator: Address,
}

impl EcycleService {
    pub fn new(relay: Arc<Relay>, binder: IdentityBinder, operator: Address) -> Self {
        Self {
            relay,
            binder,
            operator,
        }
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    /// The wallet bound to `external_id`, creating and funding it if needed.
    pub async fn wallet_of(&self, external_id: &str) -> ServiceResult<Address> {
        Ok(self.binder.resolve_or_create(external_id).await?)
    }

    /// Register the caller as a recycler.
    pub async fn register(&self, external_id: &str) -> ServiceResult<Address> {
        let account = self.wallet_of(external_id).await?;
        self.invoke(account, Transition::RegisterUser).await?;
        info!(external_id, account = %account.short(), "user registered");
        Ok(account)
    }

    /// Self-register the caller as a buyer (unverified until the operator
    /// verifies them).
    pub async fn register_buyer(
        &self,
        external_id: &str,
        name: &str,
        location: &str,
        additional_info: &str,
    ) -> ServiceResult<Address> {
        let account = self.wallet_of(external_id).await?;
        self.invoke(
            account,
            Transition::RegisterBuyer {
                name: name.to_string(),
                location: location.to_string(),
                additional_info: additional_info.to_string(),
            },
        )
        .await?;
        Ok(account)
    }

    /// Record recycled e-waste; mints tokens to the caller at the protocol
    /// reward rate. Returns the new record id and the minted amount.
    pub async fn recycle(
        &self,
        external_id: &str,
        description: &str,
        weight: Amount,
    ) -> ServiceResult<(EwasteId, Amount)> {
        let account = self.wallet_of(external_id).await?;
        let effect = self
            .invoke(
                account,
                Transition::RecycleEwaste {
                    description: description.to_string(),
                    weight,
                },
            )
            .await?;
        match effect {
            TransitionEffect::EwasteRecycled { id, minted, .. } => Ok((id, minted)),
            _ => Err(ServiceError::UnexpectedEffect),
        }
    }

    /// Post an errand, escrowing `reward` from the caller's balance.
    pub async fn create_errand(
        &self,
        external_id: &str,
        description: &str,
        reward: Amount,
    ) -> ServiceResult<ErrandId> {
        let account = self.wallet_of(external_id).await?;
        let effect = self
            .invoke(
                account,
                Transition::CreateErrand {
                    description: description.to_string(),
                    reward,
                },
            )
            .await?;
        match effect {
            TransitionEffect::ErrandCreated { id, .. } => Ok(id),
            _ => Err(ServiceError::UnexpectedEffect),
        }
    }

    /// Complete an errand; first valid caller wins the escrowed reward.
    pub async fn complete_errand(
        &self,
        external_id: &str,
        errand: ErrandId,
    ) -> ServiceResult<Amount> {
        let account = self.wallet_of(external_id).await?;
        let effect = self
            .invoke(account, Transition::CompleteErrand { errand })
            .await?;
        match effect {
            TransitionEffect::ErrandCompleted { reward, .. } => Ok(reward),
            _ => Err(ServiceError::UnexpectedEffect),
        }
    }

    /// Operator-only: mark a self-registered buyer as verified.
    pub async fn verify_buyer(&self, buyer: Address) -> ServiceResult<()> {
        self.invoke(self.operator, Transition::VerifyBuyer { buyer })
            .await?;
        info!(buyer = %buyer.short(), "buyer verified");
        Ok(())
    }

    /// Verified-buyer-only: mark an e-waste record processed; credits the
    /// original recycler's reputation.
    pub async fn process_ewaste(
        &self,
        external_id: &str,
        ewaste: EwasteId,
    ) -> ServiceResult<Address> {
        let account = self.wallet_of(external_id).await?;
        let effect = self
            .invoke(account, Transition::ProcessEwaste { ewaste })
            .await?;
        match effect {
            TransitionEffect::EwasteProcessed { recycler, .. } => Ok(recycler),
            _ => Err(ServiceError::UnexpectedEffect),
        }
    }

    /// Verified-buyer-only: pay tokens to a recycler. The protocol does not
    /// tie the payment to any particular e-waste record.
    pub async fn pay_for_ewaste(
        &self,
        external_id: &str,
        recycler: Address,
        amount: Amount,
    ) -> ServiceResult<()> {
        let account = self.wallet_of(external_id).await?;
        self.invoke(account, Transition::PayForEwaste { recycler, amount })
            .await?;
        Ok(())
    }

    /// Plain token transfer from the caller's wallet.
    pub async fn transfer(
        &self,
        external_id: &str,
        to: Address,
        value: Amount,
    ) -> ServiceResult<()> {
        let account = self.wallet_of(external_id).await?;
        self.invoke(account, Transition::Transfer { to, value })
            .await?;
        Ok(())
    }

    // ---- Queries ----

    /// Aggregate stats for an account.
    pub async fn stats(&self, account: Address) -> ServiceResult<AccountStats> {
        let token_balance = self.amount_view(View::TokenBalance(account)).await?;
        let native_balance = self.amount_view(View::NativeBalance(account)).await?;
        let reputation = self.count_view(View::Reputation(account)).await?;
        let recycled_amount = self.amount_view(View::RecycledAmount(account)).await?;
        Ok(AccountStats {
            account,
            token_balance,
            native_balance,
            reputation,
            recycled_amount,
        })
    }

    pub async fn buyer_info(&self, account: Address) -> ServiceResult<Option<BuyerRecord>> {
        self.relay
            .view(View::BuyerInfo(account))
            .await?
            .into_buyer()
            .ok_or(ServiceError::Relay(
                ecycle_relay::RelayError::UnexpectedViewResult,
            ))
    }

    pub async fn errand(&self, id: ErrandId) -> ServiceResult<Option<ErrandRecord>> {
        self.relay
            .view(View::Errand(id))
            .await?
            .into_errand()
            .ok_or(ServiceError::Relay(
                ecycle_relay::RelayError::UnexpectedViewResult,
            ))
    }

    pub async fn ewaste(&self, id: EwasteId) -> ServiceResult<Option<EwasteRecord>> {
        self.relay
            .view(View::Ewaste(id))
            .await?
            .into_ewaste()
            .ok_or(ServiceError::Relay(
                ecycle_relay::RelayError::UnexpectedViewResult,
            ))
    }

    pub async fn errand_count(&self) -> ServiceResult<u64> {
        self.count_view(View::ErrandCount).await
    }

    pub async fn ewaste_count(&self) -> ServiceResult<u64> {
        self.count_view(View::EwasteCount).await
    }

    pub async fn total_supply(&self) -> ServiceResult<Amount> {
        self.amount_view(View::TotalSupply).await
    }

    pub async fn escrow_balance(&self) -> ServiceResult<Amount> {
        self.amount_view(View::EscrowBalance).await
    }

    // ---- Internals ----

    async fn invoke(
        &self,
        account: Address,
        transition: Transition,
    ) -> ServiceResult<TransitionEffect> {
        let receipt = self
            .relay
            .execute(account, Call::Invoke(transition))
            .await?;
        match receipt.status {
            ecycle_chain::TxStatus::Applied {
                effect: Some(effect),
            } => Ok(effect),
            _ => Err(ServiceError::UnexpectedEffect),
        }
    }

    async fn amount_view(&self, view: View) -> ServiceResult<Amount> {
        self.relay
            .view(view)
            .await?
            .into_amount()
            .ok_or(ServiceError::Relay(
                ecycle_relay::RelayError::UnexpectedViewResult,
            ))
    }

    async fn count_view(&self, view: View) -> ServiceResult<u64> {
        self.relay
            .view(view)
            .await?
            .into_count()
            .ok_or(ServiceError::Relay(
                ecycle_relay::RelayError::UnexpectedViewResult,
            ))
    }
}

/// A complete in-process stack: chain, relay, faucet, binder, service.
pub struct LocalStack {
    pub service: EcycleService,
    pub chain: Arc<InMemoryChain>,
    pub relay: Arc<Relay>,
}

/// Wires an [`EcycleService`] over an [`InMemoryChain`] for demos and tests.
///
/// The operator account is generated into the keystore, made the contract
/// owner, given the genesis native allocation, and used as the faucet's
/// funding account.
pub struct ServiceBuilder {
    chain_config: ChainConfig,
    relay_config: RelayConfig,
    operator_native: Amount,
    store: Option<Arc<dyn BindingStore>>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            chain_config: ChainConfig::default(),
            relay_config: RelayConfig::default(),
            operator_native: 1_000_000,
            store: None,
        }
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_config(mut self, config: ChainConfig) -> Self {
        self.chain_config = config;
        self
    }

    pub fn relay_config(mut self, config: RelayConfig) -> Self {
        self.relay_config = config;
        self
    }

    pub fn operator_native(mut self, amount: Amount) -> Self {
        self.operator_native = amount;
        self
    }

    pub fn binding_store(mut self, store: Arc<dyn BindingStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> LocalStack {
        let keystore = Arc::new(Keystore::new());
        let operator = keystore.generate();

        let genesis =
            GenesisConfig::new(operator).with_native_balance(operator, self.operator_native);
        let chain = Arc::new(InMemoryChain::new(genesis, self.chain_config));
        let relay = Arc::new(Relay::new(chain.clone(), keystore, self.relay_config));
        let faucet = Arc::new(Faucet::new(relay.clone(), operator));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryBindingStore::new()));
        let binder = IdentityBinder::new(store, relay.clone(), faucet);

        LocalStack {
            service: EcycleService::new(relay.clone(), binder, operator),
            chain,
            relay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ecycle_ledger::LedgerError;
    use ecycle_relay::RelayError;

    fn fast_stack() -> LocalStack {
        ServiceBuilder::new()
            .chain_config(ChainConfig {
                block_interval: Duration::from_millis(10),
                ..ChainConfig::default()
            })
            .relay_config(RelayConfig {
                poll_interval: Duration::from_millis(5),
                confirm_timeout: Duration::from_millis(2_000),
                ..RelayConfig::default()
            })
            .build()
    }

    fn ledger_err(err: &ServiceError) -> &LedgerError {
        err.as_ledger().expect("expected a ledger rule violation")
    }

    #[tokio::test]
    async fn register_creates_funds_and_registers() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        let account = stack.service.register("tg:alice").await.unwrap();
        let stats = stack.service.stats(account).await.unwrap();
        sealer.abort();

        assert_eq!(stats.token_balance, 0);
        assert_eq!(stats.reputation, 0);
        // Funded by the faucet, minus fees paid so far.
        assert!(stats.native_balance > 0);
    }

    #[tokio::test]
    async fn double_registration_surfaces_already_registered() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        stack.service.register("tg:alice").await.unwrap();
        let err = stack.service.register("tg:alice").await.unwrap_err();
        sealer.abort();

        assert_eq!(ledger_err(&err), &LedgerError::AlreadyRegistered);
    }

    #[tokio::test]
    async fn recycle_mints_tokens_and_tracks_stats() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        let account = stack.service.register("tg:alice").await.unwrap();
        let (id, minted) = stack
            .service
            .recycle("tg:alice", "old desktop", 5)
            .await
            .unwrap();
        let stats = stack.service.stats(account).await.unwrap();
        sealer.abort();

        assert_eq!(id, 0);
        assert_eq!(minted, 50);
        assert_eq!(stats.token_balance, 50);
        assert_eq!(stats.recycled_amount, 5);
        assert_eq!(stats.reputation, 1);
        assert_eq!(stack.service.ewaste_count().await.unwrap(), 1);
        assert_eq!(stack.service.total_supply().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn errand_lifecycle_moves_the_reward() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        let alice = stack.service.register("tg:alice").await.unwrap();
        let bob = stack.service.register("tg:bob").await.unwrap();
        stack
            .service
            .recycle("tg:alice", "server rack", 10)
            .await
            .unwrap();

        let errand = stack
            .service
            .create_errand("tg:alice", "pick up the rack", 40)
            .await
            .unwrap();
        assert_eq!(stack.service.escrow_balance().await.unwrap(), 40);

        let reward = stack
            .service
            .complete_errand("tg:bob", errand)
            .await
            .unwrap();
        let alice_stats = stack.service.stats(alice).await.unwrap();
        let bob_stats = stack.service.stats(bob).await.unwrap();
        let record = stack.service.errand(errand).await.unwrap().unwrap();
        sealer.abort();

        assert_eq!(reward, 40);
        assert_eq!(alice_stats.token_balance, 60);
        assert_eq!(bob_stats.token_balance, 40);
        assert_eq!(bob_stats.reputation, 1);
        assert_eq!(stack.service.escrow_balance().await.unwrap(), 0);
        assert_eq!(record.runner, Some(bob));
        assert!(record.completed);
    }

    #[tokio::test]
    async fn concurrent_completion_pays_exactly_once() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        stack.service.register("tg:alice").await.unwrap();
        let bob = stack.service.register("tg:bob").await.unwrap();
        let carol = stack.service.register("tg:carol").await.unwrap();
        stack
            .service
            .recycle("tg:alice", "pallet of phones", 10)
            .await
            .unwrap();
        let errand = stack
            .service
            .create_errand("tg:alice", "sort the pallet", 50)
            .await
            .unwrap();

        let service = Arc::new(stack.service);
        let t1 = {
            let service = service.clone();
            tokio::spawn(async move { service.complete_errand("tg:bob", errand).await })
        };
        let t2 = {
            let service = service.clone();
            tokio::spawn(async move { service.complete_errand("tg:carol", errand).await })
        };
        let (r1, r2) = (t1.await.unwrap(), t2.await.unwrap());

        // Exactly one completion wins; the loser observes AlreadyAssigned.
        let (winner_count, loser) = match (&r1, &r2) {
            (Ok(_), Err(e)) => (1, e),
            (Err(e), Ok(_)) => (1, e),
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        assert_eq!(winner_count, 1);
        assert_eq!(ledger_err(loser), &LedgerError::AlreadyAssigned);

        // No double payout: exactly 50 left escrow.
        let bob_balance = service.stats(bob).await.unwrap().token_balance;
        let carol_balance = service.stats(carol).await.unwrap().token_balance;
        sealer.abort();
        assert_eq!(bob_balance + carol_balance, 50);
        assert_eq!(service.escrow_balance().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn buyer_flow_verify_process_pay() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        let alice = stack.service.register("tg:alice").await.unwrap();
        stack
            .service
            .recycle("tg:alice", "monitor pallet", 8)
            .await
            .unwrap();

        let buyer = stack
            .service
            .register_buyer("tg:depot", "Depot Ltd", "Accra", "weighbridge on site")
            .await
            .unwrap();
        assert!(!stack
            .service
            .buyer_info(buyer)
            .await
            .unwrap()
            .unwrap()
            .verified);

        // Processing before verification is unauthorized.
        let err = stack
            .service
            .process_ewaste("tg:depot", 0)
            .await
            .unwrap_err();
        assert_eq!(ledger_err(&err), &LedgerError::Unauthorized);

        stack.service.verify_buyer(buyer).await.unwrap();
        let recycler = stack.service.process_ewaste("tg:depot", 0).await.unwrap();
        assert_eq!(recycler, alice);
        // +1 recycle, +2 processing.
        assert_eq!(stack.service.stats(alice).await.unwrap().reputation, 3);

        // Second processing of the same record fails.
        let err = stack
            .service
            .process_ewaste("tg:depot", 0)
            .await
            .unwrap_err();
        assert_eq!(ledger_err(&err), &LedgerError::AlreadyProcessed);

        // Fund the buyer with tokens, then pay the recycler.
        stack
            .service
            .transfer("tg:alice", buyer, 30)
            .await
            .unwrap();
        stack
            .service
            .pay_for_ewaste("tg:depot", alice, 25)
            .await
            .unwrap();
        let alice_balance = stack.service.stats(alice).await.unwrap().token_balance;
        sealer.abort();
        assert_eq!(alice_balance, 75);
    }

    #[tokio::test]
    async fn wallets_are_stable_across_commands() {
        let stack = fast_stack();
        let sealer = stack.chain.spawn_sealer();

        let first = stack.service.wallet_of("tg:alice").await.unwrap();
        let second = stack.service.register("tg:alice").await.unwrap();
        sealer.abort();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn bindings_persist_across_service_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");

        let wallet = {
            let store: Arc<dyn BindingStore> =
                Arc::new(ecycle_identity::FileBindingStore::open(&path).unwrap());
            let stack = ServiceBuilder::new()
                .chain_config(ChainConfig {
                    block_interval: Duration::from_millis(10),
                    ..ChainConfig::default()
                })
                .binding_store(store)
                .build();
            let sealer = stack.chain.spawn_sealer();
            let wallet = stack.service.register("tg:alice").await.unwrap();
            sealer.abort();
            wallet
        };

        // A new stack over the same binding file resolves to the same wallet.
        let store: Arc<dyn BindingStore> =
            Arc::new(ecycle_identity::FileBindingStore::open(&path).unwrap());
        let stack = ServiceBuilder::new().binding_store(store).build();
        let resolved = stack.service.wallet_of("tg:alice").await.unwrap();
        assert_eq!(resolved, wallet);
    }
}
