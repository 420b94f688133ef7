//! Identity binding for Ecycle.
//!
//! Maps an external user identity (a chat account id, in the original
//! deployment) to a ledger account. Provides:
//!
//! - [`BindingStore`] — the persistence boundary for the id → wallet map
//! - [`InMemoryBindingStore`] — tests and embedding
//! - [`FileBindingStore`] — JSON-file persistence that survives restart
//! - [`IdentityBinder`] — idempotent lookup with lazy wallet creation and
//!   gas prefunding via the relay's faucet
//!
//! Bindings are permanent once created; there is no unbind operation.

pub mod binder;
pub mod error;
pub mod file;
pub mod store;

pub use binder::IdentityBinder;
pub use error::{IdentityError, IdentityResult};
pub use file::FileBindingStore;
pub use store::{Binding, BindingStore, InMemoryBindingStore};
