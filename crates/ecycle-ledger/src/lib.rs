//! Contract state machine for the Ecycle recycling-rewards token.
//!
//! This crate is the heart of Ecycle. It provides:
//! - [`ContractState`] — balances, users, buyers, e-waste records, errands,
//!   allowances, and contract-held escrow
//! - [`Transition`] — the atomic state-transition requests accepted by the
//!   contract, applied all-or-nothing
//! - [`TransitionEffect`] — what an applied transition produced
//! - [`LedgerError`] — every rule violation as a distinct error kind
//! - Read-only views over the current state
//!
//! The crate is pure and synchronous: no I/O, no clocks, no concurrency.
//! Total ordering of transitions is the execution substrate's job
//! (`ecycle-chain`); this crate only guarantees that each `apply` either
//! fully happens or leaves the state untouched.

pub mod error;
pub mod records;
pub mod state;
pub mod views;

pub use error::LedgerError;
pub use records::{
    BuyerRecord, ErrandRecord, EwasteRecord, Transition, TransitionEffect, UserRecord,
};
pub use state::{ContractState, MAX_TEXT_LEN, REWARD_RATE};
