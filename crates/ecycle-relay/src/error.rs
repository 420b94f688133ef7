use thiserror::Error;

use ecycle_chain::{ChainError, RejectReason, TxHash};
use ecycle_ledger::LedgerError;
use ecycle_types::{Address, Amount};

/// Outcomes of driving a transition through the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The state machine rejected the transition. Terminal; never retried.
    #[error("transition reverted: {0}")]
    Reverted(LedgerError),

    /// The substrate refused the transaction before execution.
    #[error("transaction rejected by the substrate: {0:?}")]
    Rejected(RejectReason),

    /// Confirmation was not observed within the bounded retry budget.
    ///
    /// The transaction may still land: callers must re-query state rather
    /// than assume it did or did not apply.
    #[error("no confirmation after {attempts} attempts")]
    ConfirmTimeout {
        attempts: u32,
        tx_hash: Option<TxHash>,
    },

    #[error("no signing key held for account {0}")]
    UnknownAccount(Address),

    #[error("funding account too low: required {required}, available {available}")]
    FaucetDry { required: Amount, available: Amount },

    #[error("substrate returned a mismatched view result")]
    UnexpectedViewResult,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("internal relay error: {0}")]
    Internal(String),
}

impl RelayError {
    /// The ledger rule violation, when that is what happened.
    pub fn as_reverted(&self) -> Option<&LedgerError> {
        match self {
            Self::Reverted(err) => Some(err),
            _ => None,
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
