/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every computation,
/// so values of different kinds can never produce colliding hashes even when
/// their byte encodings agree.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for signed transactions (the hash is also the tx handle).
    pub const TRANSACTION: Self = Self {
        domain: "ecycle-tx-v1",
    };
    /// Hasher for genesis/chain parameters.
    pub const GENESIS: Self = Self {
        domain: "ecycle-genesis-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
