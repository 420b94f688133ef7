use thiserror::Error;

use ecycle_relay::RelayError;

/// Errors from binding persistence and wallet creation.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("funding failed: {0}")]
    Funding(#[from] RelayError),

    #[error("binding store lock poisoned")]
    LockPoisoned,
}

pub type IdentityResult<T> = Result<T, IdentityError>;
