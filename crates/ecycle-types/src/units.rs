/// Unsigned quantity of tokens, native coin, or e-waste weight.
///
/// Wide enough that honest usage never overflows, but all ledger arithmetic
/// is still checked: a transition that would overflow is rejected rather
/// than wrapped.
pub type Amount = u128;

/// Monotonic errand identifier. Starts at 0, never reused.
pub type ErrandId = u64;

/// Monotonic e-waste record identifier. Starts at 0, never reused.
pub type EwasteId = u64;

/// Per-account transaction sequence number.
///
/// An account's first transaction carries nonce 0; each applied transaction
/// (including reverted ones) advances the expected nonce by 1.
pub type Nonce = u64;
