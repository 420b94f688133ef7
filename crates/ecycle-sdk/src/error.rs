use thiserror::Error;

use ecycle_identity::IdentityError;
use ecycle_ledger::LedgerError;
use ecycle_relay::RelayError;

/// Errors surfaced by the command surface.
///
/// Ledger rule violations stay distinguishable: `Relay(Reverted(_))` carries
/// the exact [`LedgerError`] the contract produced.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("receipt carried an unexpected effect")]
    UnexpectedEffect,
}

impl ServiceError {
    /// The ledger rule violation behind this error, when that is the cause.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Relay(relay) => relay.as_reverted(),
            Self::Identity(IdentityError::Funding(relay)) => relay.as_reverted(),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
