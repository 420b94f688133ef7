use thiserror::Error;

/// Errors produced at the substrate boundary.
///
/// Rule violations inside the contract are not errors here: they surface as
/// [`crate::TxStatus::Reverted`] inside a receipt. `ChainError` covers the
/// submission path and transport.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transaction signature is invalid")]
    InvalidSignature,

    #[error("signing key does not control the declared sender address")]
    SenderMismatch,

    #[error("encoding error: {0}")]
    Codec(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal chain error: {0}")]
    Internal(String),
}

pub type ChainResult<T> = Result<T, ChainError>;
