//! Transaction orchestration for Ecycle.
//!
//! The relay turns a logical intent ("recycle this weight", "complete errand
//! 7") into a signed, nonce-sequenced transaction, submits it through the
//! [`ecycle_chain::Substrate`] boundary, and waits for a definitive outcome:
//!
//! - [`Relay`] — per-account serialized submit/confirm with bounded
//!   resubmission and exponential backoff
//! - [`Keystore`] — in-memory account keys (never part of ledger state)
//! - [`Faucet`] — prerequisite native-coin funding for fresh wallets
//!
//! Rule violations reported by the contract are terminal and surfaced
//! verbatim; only transport failures and missing confirmations are retried.

pub mod config;
pub mod error;
pub mod faucet;
pub mod keystore;
pub mod relay;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use faucet::Faucet;
pub use keystore::Keystore;
pub use relay::Relay;
