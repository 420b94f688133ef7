use std::fmt;

use serde::{Deserialize, Serialize};

use ecycle_crypto::{ContentHasher, Signature, SigningKey, VerifyingKey};
use ecycle_ledger::Transition;
use ecycle_types::{Address, Amount, Nonce};

use crate::error::{ChainError, ChainResult};

/// Handle identifying a submitted transaction: the domain-separated BLAKE3
/// hash of the transaction's canonical encoding.
///
/// Resubmitting the identical transaction yields the identical handle, which
/// is what makes timeout-resubmission idempotent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated rendering for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}…)", self.short())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// What a transaction asks the substrate to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Move native coin (the fee currency). Used for gas prefunding.
    Transfer { to: Address, value: Amount },
    /// Invoke a contract transition as the transaction sender.
    Invoke(Transition),
}

/// An unsigned transaction: sender, per-account sequence number, and call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub nonce: Nonce,
    pub call: Call,
}

impl Transaction {
    /// Canonical signing payload: the bincode encoding of the transaction.
    fn encode(&self) -> ChainResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ChainError::Codec(e.to_string()))
    }

    /// The transaction hash, which doubles as its submission handle.
    pub fn hash(&self) -> ChainResult<TxHash> {
        Ok(TxHash(ContentHasher::TRANSACTION.hash(&self.encode()?)))
    }
}

/// A transaction plus the sender's public key and signature over its hash.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub public_key: [u8; 32],
    pub signature: Signature,
}

impl SignedTransaction {
    /// Sign `tx` with `key`. Fails with [`ChainError::SenderMismatch`] if the
    /// key does not control `tx.sender`.
    pub fn sign(tx: Transaction, key: &SigningKey) -> ChainResult<Self> {
        if key.address() != tx.sender {
            return Err(ChainError::SenderMismatch);
        }
        let hash = tx.hash()?;
        let signature = key.sign(hash.as_bytes());
        Ok(Self {
            tx,
            public_key: key.verifying_key().as_bytes(),
            signature,
        })
    }

    /// Stateless validity: the public key controls the sender address and the
    /// signature covers the transaction hash.
    pub fn verify(&self) -> ChainResult<TxHash> {
        let key =
            VerifyingKey::from_bytes(self.public_key).map_err(|_| ChainError::InvalidSignature)?;
        if key.to_address() != self.tx.sender {
            return Err(ChainError::SenderMismatch);
        }
        let hash = self.tx.hash()?;
        key.verify(hash.as_bytes(), &self.signature)
            .map_err(|_| ChainError::InvalidSignature)?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(key: &SigningKey, nonce: Nonce) -> Transaction {
        Transaction {
            sender: key.address(),
            nonce,
            call: Call::Invoke(Transition::RegisterUser),
        }
    }

    #[test]
    fn hash_is_deterministic_and_nonce_sensitive() {
        let key = SigningKey::generate();
        let a = sample_tx(&key, 0);
        let b = sample_tx(&key, 1);
        assert_eq!(a.hash().unwrap(), a.hash().unwrap());
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let key = SigningKey::generate();
        let tx = sample_tx(&key, 0);
        let expected = tx.hash().unwrap();
        let signed = SignedTransaction::sign(tx, &key).unwrap();
        assert_eq!(signed.verify().unwrap(), expected);
    }

    #[test]
    fn sign_rejects_foreign_sender() {
        let key = SigningKey::generate();
        let other = SigningKey::generate();
        let tx = sample_tx(&other, 0);
        assert!(matches!(
            SignedTransaction::sign(tx, &key),
            Err(ChainError::SenderMismatch)
        ));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let key = SigningKey::generate();
        let tx = sample_tx(&key, 0);
        let mut signed = SignedTransaction::sign(tx, &key).unwrap();
        signed.tx.nonce = 7;
        assert!(matches!(
            signed.verify(),
            Err(ChainError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_rejects_swapped_key() {
        let key = SigningKey::generate();
        let other = SigningKey::generate();
        let tx = sample_tx(&key, 0);
        let mut signed = SignedTransaction::sign(tx, &key).unwrap();
        signed.public_key = other.verifying_key().as_bytes();
        assert!(matches!(signed.verify(), Err(ChainError::SenderMismatch)));
    }

    #[test]
    fn resubmission_has_the_same_handle() {
        let key = SigningKey::generate();
        let tx = sample_tx(&key, 3);
        let first = SignedTransaction::sign(tx.clone(), &key).unwrap();
        let second = SignedTransaction::sign(tx, &key).unwrap();
        assert_eq!(first.verify().unwrap(), second.verify().unwrap());
    }

    #[test]
    fn txhash_renders_as_hex() {
        let hash = TxHash::from_raw([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(format!("{hash:?}").contains("abababab"));
    }
}
