use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes in an account address.
pub const ADDRESS_LEN: usize = 20;

/// Ledger account identifier.
///
/// An `Address` is the last 20 bytes of a domain-separated BLAKE3 hash of an
/// ed25519 verifying key. The same key always produces the same address, and
/// addresses are the sole account identity on the ledger: token balances,
/// user records, buyer records, and allowances are all keyed by `Address`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Derive an address from raw ed25519 public-key bytes.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"ecycle-address-v1:");
        hasher.update(public_key);
        let digest = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest.as_bytes()[32 - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Create from raw address bytes. Use [`Self::from_public_key`] for
    /// production code.
    pub const fn from_raw(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw 20-byte address.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Full `0x`-prefixed hex rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Abbreviated rendering for logs (`0x` + first 4 bytes).
    pub fn short(&self) -> String {
        format!("0x{}…", hex::encode(&self.0[..4]))
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(TypeError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let pk = [42u8; 32];
        assert_eq!(Address::from_public_key(&pk), Address::from_public_key(&pk));
    }

    #[test]
    fn different_keys_produce_different_addresses() {
        let a = Address::from_public_key(&[1; 32]);
        let b = Address::from_public_key(&[2; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_public_key(&[7; 32]);
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn hex_roundtrip_without_prefix() {
        let addr = Address::from_raw([0xab; ADDRESS_LEN]);
        let bare = hex::encode(addr.as_bytes());
        assert_eq!(Address::from_hex(&bare).unwrap(), addr);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = Address::from_hex("0xdeadbeef").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: 4
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            Address::from_hex("0xzz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_prefixed_hex() {
        let addr = Address::from_raw([0x11; ADDRESS_LEN]);
        let shown = format!("{addr}");
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 2 + ADDRESS_LEN * 2);
    }

    #[test]
    fn short_is_abbreviated() {
        let addr = Address::from_raw([0xcd; ADDRESS_LEN]);
        assert!(addr.short().starts_with("0xcdcdcdcd"));
    }

    #[test]
    fn serde_roundtrip() {
        let addr = Address::from_public_key(&[9; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let a = Address::from_raw([0; ADDRESS_LEN]);
        let b = Address::from_raw([1; ADDRESS_LEN]);
        assert!(a < b);
    }
}
