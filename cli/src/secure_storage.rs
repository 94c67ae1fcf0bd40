//! Encrypted owner keystore
//!
//! The owner secret is encrypted with AES-256-GCM under a key derived from a
//! password with Argon2id. The public key is stored in the clear so commands
//! that only need the owner set (e.g. `address`) never ask for a password.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{bail, Context, Result};
use argon2::{password_hash::rand_core::RngCore, Argon2};
use delegation::PublicKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use crate::config::write_private;
use crate::crypto::OwnerKey;

/// Argon2 parameters for key derivation
const ARGON2_M_COST: u32 = 65536; // 64 MB memory
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

const KEYSTORE_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// On-disk keystore format
#[derive(Serialize, Deserialize)]
pub struct OwnerKeyFile {
    pub version: u8,
    /// Owner public key (hex)
    pub public_key: String,
    /// Argon2 salt (base64)
    pub salt: String,
    /// AES-GCM nonce (base64)
    pub nonce: String,
    /// Encrypted 32-byte secret (base64)
    pub ciphertext: String,
    pub created_at: String,
}

fn cipher_for(password: &str, salt: &[u8]) -> Result<Aes256Gcm> {
    let params = argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| anyhow::anyhow!("Argon2 params error: {}", e))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key_bytes = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key_bytes[..])
        .map_err(|e| anyhow::anyhow!("Key derivation failed: {}", e))?;

    Aes256Gcm::new_from_slice(&key_bytes[..])
        .map_err(|e| anyhow::anyhow!("Cipher creation failed: {}", e))
}

impl OwnerKeyFile {
    pub fn encrypt(key: &OwnerKey, password: &str) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let cipher = cipher_for(password, &salt)?;
        let secret = key.export_secret();
        let ciphertext = cipher
            .encrypt(&Nonce::from(nonce_bytes), &secret[..])
            .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

        Ok(Self {
            version: KEYSTORE_VERSION,
            public_key: key.public_key().to_string(),
            salt: b64::encode(&salt),
            nonce: b64::encode(&nonce_bytes),
            ciphertext: b64::encode(&ciphertext),
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn decrypt(&self, password: &str) -> Result<OwnerKey> {
        if self.version != KEYSTORE_VERSION {
            bail!("Unsupported keystore version {}", self.version);
        }

        let salt = b64::decode(&self.salt).context("Invalid salt encoding")?;
        let nonce_bytes: [u8; NONCE_LEN] = b64::decode(&self.nonce)
            .context("Invalid nonce encoding")?
            .try_into()
            .map_err(|_| anyhow::anyhow!("Invalid nonce length"))?;
        let ciphertext = b64::decode(&self.ciphertext).context("Invalid ciphertext encoding")?;

        let cipher = cipher_for(password, &salt)?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(&Nonce::from(nonce_bytes), ciphertext.as_slice())
                .map_err(|_| anyhow::anyhow!("Decryption failed - wrong password or corrupted data"))?,
        );

        let secret: Zeroizing<[u8; 32]> = Zeroizing::new(
            plaintext
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Decrypted secret has wrong length"))?,
        );
        let key = OwnerKey::from_secret_bytes(&secret);

        if key.public_key() != self.public_key()? {
            bail!("Keystore public key does not match decrypted secret");
        }
        Ok(key)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_hex(&self.public_key).context("Invalid public key in keystore")
    }
}

/// Owner keystore at a fixed path
pub struct OwnerKeyStore {
    path: PathBuf,
}

impl OwnerKeyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, key: &OwnerKey, password: &str) -> Result<()> {
        let file = OwnerKeyFile::encrypt(key, password)?;
        let json = serde_json::to_string_pretty(&file)?;
        write_private(&self.path, json.as_bytes())
    }

    fn read(&self) -> Result<OwnerKeyFile> {
        if !self.exists() {
            bail!("No owner key found. Run 'delegate keygen' first.");
        }
        let json = fs::read_to_string(&self.path).context("Failed to read owner keystore")?;
        serde_json::from_str(&json).context("Failed to parse owner keystore")
    }

    /// Public key only; no password needed
    pub fn public_key(&self) -> Result<PublicKey> {
        self.read()?.public_key()
    }

    pub fn load(&self, password: &str) -> Result<OwnerKey> {
        self.read()?.decrypt(password)
    }
}

/// Password strength validation
pub fn validate_password_strength(password: &str) -> Result<()> {
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_upper || !has_lower || !has_digit {
        bail!("Password must contain uppercase, lowercase, and numeric characters");
    }

    Ok(())
}

/// Prompt for password securely (hides input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

/// Prompt for password with confirmation
pub fn prompt_new_password(prompt: &str) -> Result<String> {
    let password = prompt_password(prompt)?;
    let confirm = prompt_password("Confirm password: ")?;

    if password != confirm {
        bail!("Passwords do not match");
    }

    validate_password_strength(&password)?;

    Ok(password)
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine};

    pub fn encode(data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    pub fn decode(s: &str) -> anyhow::Result<Vec<u8>> {
        STANDARD
            .decode(s)
            .map_err(|e| anyhow::anyhow!("Base64 decode error: {}", e))
    }
}
