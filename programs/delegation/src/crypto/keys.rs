//! Ed25519 key and signature types used across the protocol
//!
//! Verification always goes through `verify_strict`, which rejects
//! non-canonical signatures and small-order public keys. Malleable
//! signatures would otherwise let a third party mint a second valid
//! witness for the same transaction.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};

use crate::constants::{PUBKEY_LEN, SIGNATURE_LEN};

/// A 32-byte compressed Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BorshSerialize, BorshDeserialize)]
pub struct PublicKey(pub [u8; PUBKEY_LEN]);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    /// Parse a hex-encoded public key
    pub fn from_hex(input: &str) -> Option<Self> {
        let bytes = hex::decode(input.trim()).ok()?;
        let arr: [u8; PUBKEY_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Decompress into a dalek verifying key
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).ok()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A detached 64-byte Ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl From<DalekSignature> for Signature {
    fn from(sig: DalekSignature) -> Self {
        Self(sig.to_bytes())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Check that bytes are usable as an owner key
///
/// Rejects:
/// 1. The all-zero encoding
/// 2. Encodings that do not decompress to a curve point
/// 3. Small-order (weak) points, which verify forged signatures
pub fn validate_owner_key(key: &PublicKey) -> bool {
    if key.0.iter().all(|&b| b == 0) {
        return false;
    }

    match key.verifying_key() {
        Some(vk) => !vk.is_weak(),
        None => false,
    }
}

/// Verify a detached signature over `message`
///
/// Returns false for undecodable keys instead of erroring: every caller is
/// a gate that fails closed.
pub fn verify(key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let Some(vk) = key.verifying_key() else {
        return false;
    };
    let sig = DalekSignature::from_bytes(&signature.0);
    vk.verify_strict(message, &sig).is_ok()
}
