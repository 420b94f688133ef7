use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use ecycle_ledger::ContractState;
use ecycle_types::{Address, Amount, Nonce};

use crate::config::{ChainConfig, GenesisConfig};
use crate::error::{ChainError, ChainResult};
use crate::receipt::{Receipt, RejectReason, TxStatus};
use crate::substrate::Substrate;
use crate::tx::{Call, SignedTransaction, TxHash};
use crate::view::{View, ViewResult};

/// In-process execution substrate.
///
/// Transactions are accepted into a pending pool after stateless signature
/// checks; a seal loop drains the pool in arrival order and executes each
/// transaction against the authoritative state under a single write lock —
/// the only writer there is. Fees are charged in native coin and burned.
///
/// Sealing is either manual ([`Self::seal_block`], deterministic tests) or
/// periodic ([`Self::spawn_sealer`]).
pub struct InMemoryChain {
    config: ChainConfig,
    pool: Mutex<Vec<(TxHash, SignedTransaction)>>,
    state: RwLock<ChainState>,
}

struct ChainState {
    height: u64,
    native: HashMap<Address, Amount>,
    nonces: HashMap<Address, Nonce>,
    contract: ContractState,
    receipts: HashMap<TxHash, Receipt>,
}

impl InMemoryChain {
    /// Construct a chain from genesis; the contract is deployed at height 0.
    pub fn new(genesis: GenesisConfig, config: ChainConfig) -> Self {
        let mut native = HashMap::new();
        for (account, amount) in &genesis.native_balances {
            native.insert(*account, *amount);
        }
        info!(
            owner = %genesis.contract_owner.short(),
            allocations = genesis.native_balances.len(),
            "chain initialized"
        );
        Self {
            config,
            pool: Mutex::new(Vec::new()),
            state: RwLock::new(ChainState {
                height: 0,
                native,
                nonces: HashMap::new(),
                contract: ContractState::new(genesis.contract_owner),
                receipts: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of transactions waiting for the next seal.
    pub fn pending_count(&self) -> usize {
        self.pool.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Seal one block: drain the pending pool and execute every transaction
    /// in arrival order. Returns the number of transactions sealed.
    pub fn seal_block(&self) -> ChainResult<usize> {
        // Drain outside the state lock so submissions never deadlock with
        // the seal loop.
        let pending: Vec<(TxHash, SignedTransaction)> = {
            let mut pool = self
                .pool
                .lock()
                .map_err(|_| ChainError::Internal("pool lock poisoned".into()))?;
            pool.drain(..).collect()
        };

        let mut state = self
            .state
            .write()
            .map_err(|_| ChainError::Internal("state lock poisoned".into()))?;
        state.height += 1;
        let height = state.height;

        let mut sealed = 0;
        for (hash, stx) in pending {
            if state.receipts.contains_key(&hash) {
                // Resubmission of an already-sealed transaction.
                debug!(tx = %hash.short(), "skipping duplicate of sealed transaction");
                continue;
            }

            let status = execute(&mut state, self.config.base_fee, &stx);
            match &status {
                TxStatus::Applied { .. } => {
                    debug!(tx = %hash.short(), height, "transaction applied")
                }
                TxStatus::Reverted(err) => {
                    debug!(tx = %hash.short(), height, %err, "transaction reverted")
                }
                TxStatus::Rejected(reason) => {
                    warn!(tx = %hash.short(), height, ?reason, "transaction rejected")
                }
            }
            state.receipts.insert(
                hash,
                Receipt {
                    tx_hash: hash,
                    height,
                    status,
                },
            );
            sealed += 1;
        }

        if sealed > 0 {
            info!(height, sealed, "block sealed");
        }
        Ok(sealed)
    }

    /// Spawn a background task sealing a block every `block_interval`.
    pub fn spawn_sealer(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let chain = Arc::clone(self);
        let interval = chain.config.block_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(err) = chain.seal_block() {
                    warn!(%err, "seal loop error");
                }
            }
        })
    }
}

/// Execute one transaction against authoritative state. Single caller: the
/// seal loop, under the write lock.
fn execute(state: &mut ChainState, base_fee: Amount, stx: &SignedTransaction) -> TxStatus {
    let tx = &stx.tx;

    let expected = state.nonces.get(&tx.sender).copied().unwrap_or(0);
    if tx.nonce != expected {
        return TxStatus::Rejected(RejectReason::BadNonce {
            expected,
            got: tx.nonce,
        });
    }

    let available = state.native.get(&tx.sender).copied().unwrap_or(0);
    let required = match &tx.call {
        Call::Transfer { value, .. } => base_fee.saturating_add(*value),
        Call::Invoke(_) => base_fee,
    };
    if available < required {
        return TxStatus::Rejected(RejectReason::FeeUnpayable {
            required,
            available,
        });
    }

    match &tx.call {
        Call::Transfer { to, value } => {
            if *to != tx.sender {
                let Some(new_to) = state
                    .native
                    .get(to)
                    .copied()
                    .unwrap_or(0)
                    .checked_add(*value)
                else {
                    return TxStatus::Rejected(RejectReason::Overflow);
                };
                state.native.insert(*to, new_to);
                state.native.insert(tx.sender, available - required);
            } else {
                // Self-transfer still burns the fee.
                state.native.insert(tx.sender, available - base_fee);
            }
            state.nonces.insert(tx.sender, expected + 1);
            TxStatus::Applied { effect: None }
        }
        Call::Invoke(transition) => {
            // Fee and nonce are consumed whether or not the transition
            // applies; only substrate-level rejections are free.
            state.native.insert(tx.sender, available - base_fee);
            state.nonces.insert(tx.sender, expected + 1);
            match state.contract.apply(tx.sender, transition) {
                Ok(effect) => TxStatus::Applied {
                    effect: Some(effect),
                },
                Err(err) => TxStatus::Reverted(err),
            }
        }
    }
}

#[async_trait]
impl Substrate for InMemoryChain {
    async fn submit(&self, tx: SignedTransaction) -> ChainResult<TxHash> {
        let hash = tx.verify()?;

        let already_sealed = {
            let state = self
                .state
                .read()
                .map_err(|_| ChainError::Internal("state lock poisoned".into()))?;
            state.receipts.contains_key(&hash)
        };
        if already_sealed {
            debug!(tx = %hash.short(), "submit: already sealed");
            return Ok(hash);
        }

        let mut pool = self
            .pool
            .lock()
            .map_err(|_| ChainError::Internal("pool lock poisoned".into()))?;
        if pool.iter().any(|(pending, _)| *pending == hash) {
            debug!(tx = %hash.short(), "submit: already pending");
        } else {
            debug!(tx = %hash.short(), sender = %tx.tx.sender.short(), "submit: queued");
            pool.push((hash, tx));
        }
        Ok(hash)
    }

    async fn receipt(&self, hash: TxHash) -> ChainResult<Option<Receipt>> {
        let state = self
            .state
            .read()
            .map_err(|_| ChainError::Internal("state lock poisoned".into()))?;
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn call(&self, view: View) -> ChainResult<ViewResult> {
        let state = self
            .state
            .read()
            .map_err(|_| ChainError::Internal("state lock poisoned".into()))?;
        let contract = &state.contract;

        Ok(match view {
            View::TokenBalance(a) => ViewResult::Amount(contract.balance_of(a)),
            View::NativeBalance(a) => {
                ViewResult::Amount(state.native.get(&a).copied().unwrap_or(0))
            }
            View::AccountNonce(a) => {
                ViewResult::Count(state.nonces.get(&a).copied().unwrap_or(0))
            }
            View::Reputation(a) => ViewResult::Count(contract.reputation_of(a)),
            View::RecycledAmount(a) => ViewResult::Amount(contract.recycled_amount_of(a)),
            View::BuyerInfo(a) => ViewResult::Buyer(contract.buyer(a).cloned()),
            View::Errand(id) => ViewResult::Errand(contract.errand(id).cloned()),
            View::ErrandCount => ViewResult::Count(contract.errand_count()),
            View::Ewaste(id) => ViewResult::Ewaste(contract.ewaste(id).cloned()),
            View::EwasteCount => ViewResult::Count(contract.ewaste_count()),
            View::Allowance { owner, spender } => {
                ViewResult::Amount(contract.allowance(owner, spender))
            }
            View::TotalSupply => ViewResult::Amount(contract.total_supply()),
            View::EscrowBalance => ViewResult::Amount(contract.escrow_balance()),
            View::ContractOwner => ViewResult::Address(contract.owner()),
            View::Height => ViewResult::Count(state.height),
        })
    }
}
