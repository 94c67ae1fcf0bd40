//! Origin-bound session delegation
//!
//! Verifier-side half of the protocol: the contract template that binds an
//! owner key set and an origin into a program image, and the authorization
//! predicate that image runs against every transaction sent from its
//! address. Everything here is pure; the client half (issuing delegations
//! and signing sessions) lives in the CLI crate.
//!
//! ## Flow
//!
//! 1. `instantiate(owners, origin)` produces a [`ContractImage`] and address
//! 2. The owner signs a [`DelegatingTransaction`] naming an ephemeral key
//! 3. The ephemeral key signs the outer transaction id
//! 4. [`AuthorizationPredicate::approve`] checks the resulting
//!    [`AuthorizationWitness`]

pub mod constants;
pub mod crypto;
pub mod error;
pub mod predicate;
pub mod state;

#[cfg(test)]
mod tests;

pub use crypto::{PublicKey, Signature};
pub use error::{NoteError, RejectReason, TemplateError, TxError, WireError};
pub use predicate::{AuthorizationPredicate, Verdict};
pub use state::{
    decode_origin_note, derive_address, encode_origin_note, instantiate, Address,
    AuthorizationWitness, ContractImage, DelegatingTransaction, Origin, OwnerKeySet, Transaction,
    TxId, TxKind,
};
