//! Cryptographic primitives for Ecycle.
//!
//! Wraps ed25519 signing, account-address derivation, and domain-separated
//! BLAKE3 hashing behind small types so the rest of the workspace never
//! touches raw key material directly.

pub mod hasher;
pub mod signer;

pub use hasher::ContentHasher;
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
