use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use ecycle_chain::{
    Call, Receipt, SignedTransaction, Substrate, Transaction, TxHash, TxStatus, View, ViewResult,
};
use ecycle_types::{Address, Amount, Nonce};

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::keystore::Keystore;

/// Drives signed transactions through the substrate to a definitive outcome.
///
/// Many callers may execute concurrently, but submissions from the same
/// account are serialized: a per-account async mutex is held from nonce
/// read through confirmation, so one in-flight transaction per account
/// exists at a time and nonces never collide.
pub struct Relay {
    substrate: Arc<dyn Substrate>,
    keystore: Arc<Keystore>,
    config: RelayConfig,
    account_locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl Relay {
    pub fn new(substrate: Arc<dyn Substrate>, keystore: Arc<Keystore>, config: RelayConfig) -> Self {
        Self {
            substrate,
            keystore,
            config,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn keystore(&self) -> &Arc<Keystore> {
        &self.keystore
    }

    /// Execute `call` as `sender`: serialize on the account, read the current
    /// nonce, sign, submit, and wait for the receipt.
    ///
    /// Returns the receipt only for applied transactions; reverted and
    /// rejected outcomes become the corresponding [`RelayError`].
    pub async fn execute(&self, sender: Address, call: Call) -> RelayResult<Receipt> {
        let lock = self.account_lock(sender)?;
        let _guard = lock.lock().await;

        let nonce = self.account_nonce(sender).await?;
        let tx = Transaction {
            sender,
            nonce,
            call,
        };
        let signed = self.keystore.sign(tx)?;
        self.submit_and_confirm(signed).await
    }

    /// Evaluate a read-only view.
    pub async fn view(&self, view: View) -> RelayResult<ViewResult> {
        Ok(self.substrate.call(view).await?)
    }

    /// Confirmed nonce for an account.
    pub async fn account_nonce(&self, account: Address) -> RelayResult<Nonce> {
        self.substrate
            .call(View::AccountNonce(account))
            .await?
            .into_count()
            .ok_or(RelayError::UnexpectedViewResult)
    }

    /// Confirmed native-coin balance for an account.
    pub async fn native_balance(&self, account: Address) -> RelayResult<Amount> {
        self.substrate
            .call(View::NativeBalance(account))
            .await?
            .into_amount()
            .ok_or(RelayError::UnexpectedViewResult)
    }

    async fn submit_and_confirm(&self, signed: SignedTransaction) -> RelayResult<Receipt> {
        let mut backoff = self.config.retry_backoff;
        let mut last_hash = None;

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }

            // Resubmission reuses the identical signed transaction (same
            // nonce, same hash), so a late first inclusion and a resubmit
            // can never both execute.
            let hash = match self.substrate.submit(signed.clone()).await {
                Ok(hash) => hash,
                Err(err) => {
                    warn!(attempt, %err, "submission failed; will retry");
                    continue;
                }
            };
            last_hash = Some(hash);
            debug!(tx = %hash.short(), attempt, "submitted; awaiting confirmation");

            match self.await_receipt(hash).await {
                Some(receipt) => return classify(receipt),
                None => {
                    warn!(tx = %hash.short(), attempt, "confirmation timed out");
                }
            }
        }

        Err(RelayError::ConfirmTimeout {
            attempts: self.config.max_attempts,
            tx_hash: last_hash,
        })
    }

    /// Poll for a receipt until `confirm_timeout` elapses.
    ///
    /// Transport errors during polling are logged and treated as missed
    /// polls; only the deadline ends the wait.
    async fn await_receipt(&self, hash: TxHash) -> Option<Receipt> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        loop {
            match self.substrate.receipt(hash).await {
                Ok(Some(receipt)) => return Some(receipt),
                Ok(None) => {}
                Err(err) => warn!(tx = %hash.short(), %err, "receipt poll failed"),
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.config.poll_interval).await;
        }
    }

    fn account_lock(&self, account: Address) -> RelayResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .account_locks
            .lock()
            .map_err(|_| RelayError::Internal("account lock table poisoned".into()))?;
        Ok(Arc::clone(locks.entry(account).or_default()))
    }
}

fn classify(receipt: Receipt) -> RelayResult<Receipt> {
    match &receipt.status {
        TxStatus::Applied { .. } => {
            info!(tx = %receipt.tx_hash.short(), height = receipt.height, "confirmed");
            Ok(receipt)
        }
        TxStatus::Reverted(err) => Err(RelayError::Reverted(err.clone())),
        TxStatus::Rejected(reason) => Err(RelayError::Rejected(reason.clone())),
    }
}
