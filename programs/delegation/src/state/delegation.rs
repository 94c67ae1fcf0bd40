//! Delegating transaction and the authorization witness
//!
//! A delegating transaction is an owner-signed credential naming an
//! ephemeral key, an origin and an absolute expiry. It is never broadcast.
//!
//! Canonical bytes:
//! "DLGTX" || kind (1) || sender (32) || receiver (32)
//!         || amount (8) || fee (8) || expiry (8) || note_len (4) || note

use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::DELEGATION_DOMAIN;
use crate::crypto::{PublicKey, Signature};
use crate::error::{NoteError, WireError};
use crate::state::note::{decode_origin_note, encode_origin_note, Origin};
use crate::state::transaction::{put_var, TxKind};

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DelegatingTransaction {
    /// Must be `TxKind::Delegation`
    pub kind: TxKind,
    /// Owner public key granting authority
    pub sender: PublicKey,
    /// Ephemeral public key receiving authority
    pub receiver: PublicKey,
    /// Always 0
    pub amount: u64,
    /// Always 0
    pub fee: u64,
    /// Absolute unix time (seconds) after which the delegation is void
    pub expiry: u64,
    /// Encoded origin
    pub note: Vec<u8>,
}

impl DelegatingTransaction {
    pub fn new(
        owner: PublicKey,
        ephemeral: PublicKey,
        origin: &Origin,
        expiry: u64,
    ) -> Result<Self, NoteError> {
        Ok(Self {
            kind: TxKind::Delegation,
            sender: owner,
            receiver: ephemeral,
            amount: 0,
            fee: 0,
            expiry,
            note: encode_origin_note(origin)?,
        })
    }

    /// The exact bytes the owner signs
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DELEGATION_DOMAIN.len() + 1 + 64 + 24 + 4 + self.note.len());
        out.extend_from_slice(DELEGATION_DOMAIN);
        out.push(self.kind.tag());
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(self.receiver.as_bytes());
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.fee.to_le_bytes());
        out.extend_from_slice(&self.expiry.to_le_bytes());
        put_var(&mut out, &self.note);
        out
    }

    /// True if this carries the non-value-transferring delegation markers
    pub fn is_delegation_marker(&self) -> bool {
        self.kind == TxKind::Delegation && self.amount == 0 && self.fee == 0
    }

    pub fn origin(&self) -> Result<Origin, NoteError> {
        decode_origin_note(&self.note)
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, WireError> {
        Ok(self.try_to_vec()?)
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(Self::try_from_slice(bytes)?)
    }
}

/// Everything the predicate needs to justify one outer transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationWitness {
    pub delegation: DelegatingTransaction,
    /// Owner signature over `delegation.canonical_bytes()`
    pub delegation_signature: Signature,
    /// Ephemeral signature over the outer transaction id
    pub session_signature: Signature,
}
