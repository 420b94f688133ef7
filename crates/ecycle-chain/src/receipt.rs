use serde::{Deserialize, Serialize};

use ecycle_ledger::{LedgerError, TransitionEffect};
use ecycle_types::{Amount, Nonce};

use crate::tx::TxHash;

/// Why the substrate refused to apply a transaction at seal time.
///
/// Rejections consume neither fee nor nonce; the sender's sequence is
/// untouched and the transaction can be rebuilt and resubmitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The transaction's nonce does not match the account's next nonce.
    BadNonce { expected: Nonce, got: Nonce },
    /// The sender cannot pay the flat base fee (plus any native value).
    FeeUnpayable { required: Amount, available: Amount },
    /// Applying the transaction would overflow a native balance.
    Overflow,
}

/// Definitive outcome of a sealed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// The call executed. Contract invocations carry their effect; native
    /// transfers carry none.
    Applied { effect: Option<TransitionEffect> },
    /// The contract rejected the transition. The fee was charged and the
    /// nonce consumed; the error is the state machine's, verbatim.
    Reverted(LedgerError),
    /// The substrate refused the transaction before execution.
    Rejected(RejectReason),
}

impl TxStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Receipt for a sealed transaction, retrievable by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// Block height at which the transaction was sealed.
    pub height: u64,
    pub status: TxStatus,
}
