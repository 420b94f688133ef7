//! Foundation types for the Ecycle recycling-rewards ledger.
//!
//! This crate provides the account, amount, and identifier types used
//! throughout the Ecycle system. Every other Ecycle crate depends on
//! `ecycle-types`.
//!
//! # Key Types
//!
//! - [`Address`] — 20-byte account identifier derived from a public key
//! - [`Amount`] — unsigned token/native quantity (checked arithmetic only)
//! - [`ErrandId`] / [`EwasteId`] — monotonic record identifiers
//! - [`Nonce`] — per-account transaction sequence number

pub mod address;
pub mod error;
pub mod units;

pub use address::Address;
pub use error::TypeError;
pub use units::{Amount, ErrandId, EwasteId, Nonce};
