//! High-level SDK for Ecycle.
//!
//! [`EcycleService`] is the command surface consumed by front ends (the
//! original deployment drove it from a chat bot): each method resolves the
//! caller's wallet, drives the relay to a confirmed outcome, and returns a
//! typed payload or a classified error. [`ServiceBuilder`] wires a complete
//! in-process stack for demos and tests.

pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::{AccountStats, EcycleService, LocalStack, ServiceBuilder};
