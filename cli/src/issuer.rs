//! Delegation issuance
//!
//! 1. Generate a fresh ephemeral keypair
//! 2. Build the delegating transaction (owner -> ephemeral, origin, expiry)
//! 3. Ask the owner signer to sign its canonical bytes, under a timeout
//! 4. Check the returned signature before handing anything out
//!
//! If the returned future is dropped while waiting on the owner, the
//! ephemeral keypair is dropped with it and its secret is wiped.

use std::time::Duration;

use delegation::constants::MAX_ORIGIN_LEN;
use delegation::crypto::verify;
use delegation::{DelegatingTransaction, NoteError, Origin, Signature, TemplateError};
use thiserror::Error;

use crate::crypto::EphemeralKeypair;
use crate::owner_signer::OwnerSigner;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid origin note: {0}")]
    Note(#[from] NoteError),

    #[error("Invalid ttl {ttl}s at time {now}")]
    InvalidTtl { ttl: u64, now: u64 },

    #[error("Owner signature declined: {reason}")]
    OwnerSignatureDeclined { reason: String },

    #[error("Owner signer returned a signature that does not verify")]
    InvalidOwnerSignature,
}

/// A delegation ready to back a session
///
/// Persist for the session's lifetime, drop to end the session.
#[derive(Debug)]
pub struct IssuedDelegation {
    pub keypair: EphemeralKeypair,
    pub delegation: DelegatingTransaction,
    pub signature: Signature,
}

/// Issue a delegation for `origin` valid for `ttl` seconds from `now`
pub async fn authenticate<S>(
    signer: &S,
    origin: &Origin,
    ttl: u64,
    now: u64,
    approval_timeout: Duration,
) -> Result<IssuedDelegation, IssueError>
where
    S: OwnerSigner + ?Sized,
{
    if origin.len() > MAX_ORIGIN_LEN {
        return Err(TemplateError::Oversize {
            field: "origin",
            len: origin.len(),
            max: MAX_ORIGIN_LEN,
        }
        .into());
    }

    // Absolute expiry so the verifier can compare against its own clock
    let expiry = match now.checked_add(ttl) {
        Some(expiry) if ttl > 0 => expiry,
        _ => return Err(IssueError::InvalidTtl { ttl, now }),
    };

    let owner = signer.public_key();
    let keypair = EphemeralKeypair::generate();
    let delegation = DelegatingTransaction::new(owner, keypair.public_key(), origin, expiry)?;
    let message = delegation.canonical_bytes();

    tracing::debug!(%origin, expiry, ephemeral = %keypair.public_key(), "requesting owner signature");

    let signature = match tokio::time::timeout(approval_timeout, signer.sign(&message)).await {
        Ok(Ok(signature)) => signature,
        Ok(Err(e)) => {
            tracing::warn!(%origin, error = %e, "owner signer refused delegation");
            return Err(IssueError::OwnerSignatureDeclined {
                reason: e.to_string(),
            });
        }
        Err(_) => {
            tracing::warn!(%origin, timeout = ?approval_timeout, "owner signer timed out");
            return Err(IssueError::OwnerSignatureDeclined {
                reason: format!("no response within {:?}", approval_timeout),
            });
        }
    };

    if !verify(&owner, &message, &signature) {
        return Err(IssueError::InvalidOwnerSignature);
    }

    tracing::info!(%origin, expiry, "delegation issued");

    Ok(IssuedDelegation {
        keypair,
        delegation,
        signature,
    })
}
