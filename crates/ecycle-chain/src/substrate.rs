use async_trait::async_trait;

use crate::error::ChainResult;
use crate::receipt::Receipt;
use crate::tx::{SignedTransaction, TxHash};
use crate::view::{View, ViewResult};

/// Client boundary to the execution substrate.
///
/// The orchestrator and query layer depend only on this trait; the wire
/// protocol behind it is substrate-defined. Implementations must guarantee:
/// - `submit` performs stateless checks only; ordering and validation happen
///   when the transaction is sealed.
/// - `submit` is idempotent per transaction hash — re-submitting an identical
///   transaction never double-executes it.
/// - `receipt` returns `Ok(None)` until the transaction is sealed, then the
///   same receipt forever.
/// - `call` reflects sealed state only.
#[async_trait]
pub trait Substrate: Send + Sync {
    /// Submit a signed transaction for inclusion. Returns its handle.
    async fn submit(&self, tx: SignedTransaction) -> ChainResult<TxHash>;

    /// Poll for the definitive outcome of a submitted transaction.
    async fn receipt(&self, hash: TxHash) -> ChainResult<Option<Receipt>>;

    /// Evaluate a read-only view against confirmed state.
    async fn call(&self, view: View) -> ChainResult<ViewResult>;
}
