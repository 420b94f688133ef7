//! Execution substrate for Ecycle.
//!
//! This crate provides:
//! - [`Transaction`] / [`SignedTransaction`] — nonce-sequenced, ed25519-signed
//!   state-transition requests
//! - [`Receipt`] / [`TxStatus`] — the definitive outcome of a sealed transaction
//! - [`Substrate`] — the opaque client boundary the orchestrator drives
//!   (`submit` / `receipt` / `call(view)`)
//! - [`View`] / [`ViewResult`] — read-only projections over confirmed state
//! - [`InMemoryChain`] — an in-process substrate that totally orders
//!   transitions through a single-writer seal loop, enforces per-account
//!   nonces, and charges a flat native fee per transaction
//!
//! The wire encoding of a real remote substrate is out of scope; everything
//! here goes through the [`Substrate`] trait so a networked client can be
//! swapped in without touching the orchestrator.

pub mod chain;
pub mod config;
pub mod error;
pub mod receipt;
pub mod substrate;
pub mod tx;
pub mod view;

pub use chain::InMemoryChain;
pub use config::{ChainConfig, GenesisConfig};
pub use error::{ChainError, ChainResult};
pub use receipt::{Receipt, RejectReason, TxStatus};
pub use substrate::Substrate;
pub use tx::{Call, SignedTransaction, Transaction, TxHash};
pub use view::{View, ViewResult};
