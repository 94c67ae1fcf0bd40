//! Session storage collaborator
//!
//! A session record keeps everything needed to sign for one
//! (owners, origin) binding until the delegation expires: the contract
//! image, the owner-signed delegation and the ephemeral secret. Records are
//! keyed by an application-chosen session id.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use delegation::{ContractImage, DelegatingTransaction, Signature};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use crate::config::{validate_session_id, write_private};
use crate::crypto::EphemeralKeypair;
use crate::issuer::IssuedDelegation;

const RECORD_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),

    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Corrupt session record: {0}")]
    Corrupt(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),
}

/// Persisted session (hex fields)
#[derive(Serialize, Deserialize, Clone)]
pub struct SessionRecord {
    pub version: u8,
    /// Contract image bytes
    pub image: String,
    /// Origin, for display
    pub origin: String,
    /// Borsh-encoded delegating transaction
    pub delegation: String,
    pub delegation_signature: String,
    /// Ephemeral secret key
    pub ephemeral_secret: String,
    pub expiry: u64,
    pub created_at: String,
}

impl Drop for SessionRecord {
    fn drop(&mut self) {
        self.ephemeral_secret.zeroize();
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("origin", &self.origin)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, StorageError> {
    hex::decode(value).map_err(|e| StorageError::Corrupt(format!("{}: {}", field, e)))
}

impl SessionRecord {
    pub fn new(image: &ContractImage, issued: &IssuedDelegation) -> Result<Self, StorageError> {
        let delegation = issued
            .delegation
            .to_wire()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        Ok(Self {
            version: RECORD_VERSION,
            image: hex::encode(image.as_bytes()),
            origin: image.origin().to_string(),
            delegation: hex::encode(delegation),
            delegation_signature: hex::encode(issued.signature.to_bytes()),
            ephemeral_secret: hex::encode(&issued.keypair.export_secret()[..]),
            expiry: issued.delegation.expiry,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn image(&self) -> Result<ContractImage, StorageError> {
        let bytes = decode_hex("image", &self.image)?;
        ContractImage::from_bytes(&bytes).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// Rebuild the issued delegation, including the ephemeral key
    pub fn issued(&self) -> Result<IssuedDelegation, StorageError> {
        if self.version != RECORD_VERSION {
            return Err(StorageError::Corrupt(format!(
                "unsupported record version {}",
                self.version
            )));
        }

        let delegation = DelegatingTransaction::from_wire(&decode_hex("delegation", &self.delegation)?)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let signature = Signature::from_slice(&decode_hex(
            "delegation_signature",
            &self.delegation_signature,
        )?)
        .ok_or_else(|| StorageError::Corrupt("delegation_signature: wrong length".into()))?;

        let mut secret_bytes = decode_hex("ephemeral_secret", &self.ephemeral_secret)?;
        let secret: Result<[u8; 32], _> = secret_bytes.as_slice().try_into();
        secret_bytes.zeroize();
        let mut secret =
            secret.map_err(|_| StorageError::Corrupt("ephemeral_secret: wrong length".into()))?;
        let keypair = EphemeralKeypair::from_secret_bytes(&secret);
        secret.zeroize();

        if keypair.public_key() != delegation.receiver {
            return Err(StorageError::Corrupt(
                "ephemeral key does not match delegation".into(),
            ));
        }

        Ok(IssuedDelegation {
            keypair,
            delegation,
            signature,
        })
    }
}

/// Where session records live
pub trait SessionStore {
    fn put(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError>;

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError>;

    /// Returns whether a record was removed
    fn remove(&self, id: &str) -> Result<bool, StorageError>;

    fn list(&self) -> Result<Vec<String>, StorageError>;
}

fn check_id(id: &str) -> Result<(), StorageError> {
    validate_session_id(id).map_err(|e| StorageError::InvalidSessionId(e.to_string()))
}

/// One JSON file per session, owner-readable only
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl SessionStore for FileSessionStore {
    fn put(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        check_id(id)?;
        let json = serde_json::to_string_pretty(record)?;
        write_private(&self.path_for(id), json.as_bytes())
            .map_err(|e| StorageError::Unavailable(format!("{:#}", e)))
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        check_id(id)?;
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn remove(&self, id: &str) -> Result<bool, StorageError> {
        check_id(id)?;
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// In-process store
#[derive(Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionRecord>>, StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Unavailable("session map lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        check_id(id)?;
        self.lock()?.insert(id.to_string(), record.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        check_id(id)?;
        Ok(self.lock()?.get(id).cloned())
    }

    fn remove(&self, id: &str) -> Result<bool, StorageError> {
        check_id(id)?;
        Ok(self.lock()?.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut ids: Vec<String> = self.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
