//! Client-side key material
//!
//! Security features:
//! - Secret keys live inside `SigningKey`, which zeroizes on drop
//! - Clone is NOT derived on key holders to prevent accidental copies
//! - Debug output never includes secret bytes

use delegation::{PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Current wall-clock time in unix seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

// ============================================================================
// Ephemeral Session Keys
// ============================================================================

/// Session-scoped keypair (`cspk` / `cssk`)
///
/// Generated fresh for every delegation. The secret half stays on the client
/// and is wiped when the keypair is dropped, which is how a session ends.
pub struct EphemeralKeypair {
    secret: SigningKey,
    public: PublicKey,
}

// Explicitly NOT implementing Clone

impl EphemeralKeypair {
    /// Generate from OS entropy
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        let public = secret.verifying_key().into();
        Self { secret, public }
    }

    /// Rebuild a persisted session key
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        let secret = SigningKey::from_bytes(bytes);
        let public = secret.verifying_key().into();
        Self { secret, public }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message).into()
    }

    /// Export the secret for session persistence
    ///
    /// WARNING: Handle these bytes with extreme care!
    pub fn export_secret(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }
}

impl std::fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Owner Keys
// ============================================================================

/// Long-lived owner key held by the local signer
pub struct OwnerKey {
    secret: SigningKey,
}

impl OwnerKey {
    pub fn generate() -> Self {
        Self {
            secret: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(bytes),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.verifying_key().into()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message).into()
    }

    pub fn export_secret(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }
}

impl std::fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerKey")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}
