use std::sync::Arc;

use tracing::{debug, info};

use ecycle_chain::Call;
use ecycle_types::Address;

use crate::error::{RelayError, RelayResult};
use crate::relay::Relay;

/// Native-coin faucet for gas prefunding.
///
/// A freshly created wallet holds no native coin and cannot pay transaction
/// fees. Before such a wallet's first transition is submitted, the faucet
/// transfers a fixed amount from the funding account and waits for that
/// transfer to confirm. The two stages are dependent but not atomic: the
/// funding transfer must be `Applied` before the dependent transition may
/// be submitted.
pub struct Faucet {
    relay: Arc<Relay>,
    funding_account: Address,
}

impl Faucet {
    /// The funding account's key must be held by the relay's keystore.
    pub fn new(relay: Arc<Relay>, funding_account: Address) -> Self {
        Self {
            relay,
            funding_account,
        }
    }

    pub fn funding_account(&self) -> Address {
        self.funding_account
    }

    /// Top up `account` if its native balance is below the low-water mark.
    ///
    /// Returns `true` if a funding transfer was made and confirmed, `false`
    /// if the account already had enough. The check-then-fund sequence runs
    /// under the funding account's submission lock only during the transfer
    /// itself; a generously funded account is never topped up twice in a row
    /// because the confirmed balance is re-read on every call.
    pub async fn ensure_funded(&self, account: Address) -> RelayResult<bool> {
        let config = self.relay.config().clone();

        let balance = self.relay.native_balance(account).await?;
        if balance >= config.funding_low_water {
            debug!(account = %account.short(), balance, "no funding needed");
            return Ok(false);
        }

        let faucet_balance = self.relay.native_balance(self.funding_account).await?;
        if faucet_balance < config.funding_amount {
            return Err(RelayError::FaucetDry {
                required: config.funding_amount,
                available: faucet_balance,
            });
        }

        let receipt = self
            .relay
            .execute(
                self.funding_account,
                Call::Transfer {
                    to: account,
                    value: config.funding_amount,
                },
            )
            .await?;

        info!(
            account = %account.short(),
            amount = config.funding_amount,
            tx = %receipt.tx_hash.short(),
            "gas funding confirmed"
        );
        Ok(true)
    }
}
