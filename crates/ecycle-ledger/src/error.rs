use serde::{Deserialize, Serialize};

use ecycle_types::Amount;

/// Rule violations produced by contract transitions.
///
/// These are terminal: the orchestrator surfaces them to the caller verbatim
/// and never retries them. The enum is serializable because reverted
/// transitions carry their error inside the transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    #[error("account is already registered")]
    AlreadyRegistered,

    #[error("account is not registered")]
    NotRegistered,

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: Amount, available: Amount },

    #[error("caller is not authorized for this operation")]
    Unauthorized,

    #[error("errand is already completed")]
    AlreadyCompleted,

    #[error("errand is already assigned to a runner")]
    AlreadyAssigned,

    #[error("buyer is already verified")]
    AlreadyVerified,

    #[error("e-waste record is already processed")]
    AlreadyProcessed,

    #[error("no record exists at index {index}")]
    InvalidIndex { index: u64 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("text field of {len} bytes exceeds the {max} byte cap")]
    TextTooLong { len: usize, max: usize },
}
