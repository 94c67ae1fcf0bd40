//! Session signing
//!
//! Turns an unsigned outer transaction into one sent from the contract
//! account, plus the witness the predicate expects. Nothing is submitted.

use delegation::{
    derive_address, AuthorizationWitness, ContractImage, Transaction, TxError,
};
use thiserror::Error;

use crate::issuer::IssuedDelegation;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No unexpired delegation for this origin and owner set - authenticate again")]
    MissingDelegation,

    #[error("Invalid outer transaction: {0}")]
    InvalidTransaction(#[from] TxError),
}

/// Finalized outer transaction and its witness
#[derive(Debug, Clone)]
pub struct SignedOuter {
    pub transaction: Transaction,
    pub witness: AuthorizationWitness,
}

/// Holds the client's live delegations
#[derive(Debug, Default)]
pub struct SessionSigner {
    delegations: Vec<IssuedDelegation>,
}

impl SessionSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issued: IssuedDelegation) {
        self.delegations.push(issued);
    }

    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }

    /// A delegation usable for `image` at time `now`
    ///
    /// Prefers the one expiring last.
    pub fn find(&self, image: &ContractImage, now: u64) -> Option<&IssuedDelegation> {
        self.delegations
            .iter()
            .filter(|issued| {
                let d = &issued.delegation;
                now < d.expiry
                    && image.owners().contains(&d.sender)
                    && d.origin().map(|o| &o == image.origin()).unwrap_or(false)
            })
            .max_by_key(|issued| issued.delegation.expiry)
    }

    /// Sign `outer` as a transaction from `image`'s account
    pub fn sign(
        &self,
        image: &ContractImage,
        mut outer: Transaction,
        now: u64,
    ) -> Result<SignedOuter, SessionError> {
        let issued = self.find(image, now).ok_or(SessionError::MissingDelegation)?;

        outer.sender = derive_address(image);
        outer.validate()?;

        let id = outer.id();
        let session_signature = issued.keypair.sign(id.as_bytes());

        tracing::debug!(tx = %id, sender = %outer.sender, "signed outer transaction");

        Ok(SignedOuter {
            transaction: outer,
            witness: AuthorizationWitness {
                delegation: issued.delegation.clone(),
                delegation_signature: issued.signature,
                session_signature,
            },
        })
    }

    /// Drop expired delegations; their ephemeral secrets are wiped
    pub fn prune(&mut self, now: u64) -> usize {
        let before = self.delegations.len();
        self.delegations.retain(|issued| now < issued.delegation.expiry);
        let removed = before - self.delegations.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned expired delegations");
        }
        removed
    }
}
