//! Authorization predicate
//!
//! Stateless decision over (outer transaction, witness, verifier time) for a
//! fixed (owners, origin) pair. Six named gates are evaluated in order; any
//! failure rejects. The reason is kept for diagnostics and debug logging,
//! but [`AuthorizationPredicate::approve`] only ever returns a boolean so a
//! submitter cannot learn which gate failed.

use crate::crypto::verify;
use crate::error::RejectReason;
use crate::state::{
    check_template_params, AuthorizationWitness, ContractImage, Origin, OwnerKeySet, Transaction,
    TxId,
};

/// Outcome of a full evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approve)
    }
}

/// The owners and origin compiled into one contract image
#[derive(Debug, Clone)]
pub struct AuthorizationPredicate {
    owners: OwnerKeySet,
    origin: Origin,
}

/// Inputs visible to every gate
struct Evaluation<'a> {
    owners: &'a OwnerKeySet,
    origin: &'a Origin,
    outer_id: TxId,
    witness: &'a AuthorizationWitness,
    now: u64,
}

type Gate = fn(&Evaluation<'_>) -> Result<(), RejectReason>;

/// (opcode, name, check), matching `PREDICATE_PROGRAM`
const GATES: [(u8, &str, Gate); 6] = [
    (0x01, "shape", shape_gate),
    (0x02, "origin_binding", origin_binding_gate),
    (0x03, "owner_membership", owner_membership_gate),
    (0x04, "expiry", expiry_gate),
    (0x05, "delegation_signature", delegation_signature_gate),
    (0x06, "witness_binding", witness_binding_gate),
];

impl AuthorizationPredicate {
    pub fn new(image: &ContractImage) -> Self {
        Self {
            owners: image.owners().clone(),
            origin: image.origin().clone(),
        }
    }

    /// Bind parameters directly, without going through instantiation
    ///
    /// Oversized parameters are accepted here and rejected by the shape gate.
    pub fn from_params(owners: OwnerKeySet, origin: Origin) -> Self {
        Self { owners, origin }
    }

    pub fn owners(&self) -> &OwnerKeySet {
        &self.owners
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Run every gate and report the first failure
    pub fn evaluate(&self, outer: &Transaction, witness: &AuthorizationWitness, now: u64) -> Verdict {
        let outer_id = outer.id();
        match self.first_failure(outer_id, witness, now) {
            Some((name, reason)) => {
                tracing::debug!(gate = name, %reason, tx = %outer_id, "authorization rejected");
                Verdict::Reject(reason)
            }
            None => {
                tracing::trace!(tx = %outer_id, "authorization approved");
                Verdict::Approve
            }
        }
    }

    /// Name and reason of the first gate that fails, if any
    pub(crate) fn first_failure(
        &self,
        outer_id: TxId,
        witness: &AuthorizationWitness,
        now: u64,
    ) -> Option<(&'static str, RejectReason)> {
        let eval = Evaluation {
            owners: &self.owners,
            origin: &self.origin,
            outer_id,
            witness,
            now,
        };

        GATES
            .iter()
            .find_map(|(_, name, gate)| gate(&eval).err().map(|reason| (*name, reason)))
    }

    /// Protocol boundary: approve or reject, nothing more
    pub fn approve(&self, outer: &Transaction, witness: &AuthorizationWitness, now: u64) -> bool {
        self.evaluate(outer, witness, now).is_approved()
    }
}

/// Gate opcodes in evaluation order
pub fn gate_opcodes() -> Vec<u8> {
    GATES.iter().map(|(op, _, _)| *op).collect()
}

/// Template parameter sizes, then the delegation's zero-value marker
fn shape_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    check_template_params(eval.owners, eval.origin).map_err(|_| RejectReason::Oversize)?;
    if !eval.witness.delegation.is_delegation_marker() {
        return Err(RejectReason::MalformedDelegation);
    }
    Ok(())
}

fn origin_binding_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    let delegated = eval
        .witness
        .delegation
        .origin()
        .map_err(RejectReason::MalformedNote)?;
    if delegated != *eval.origin {
        return Err(RejectReason::OriginMismatch);
    }
    Ok(())
}

fn owner_membership_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    if !eval.owners.contains(&eval.witness.delegation.sender) {
        return Err(RejectReason::UnauthorizedSender);
    }
    Ok(())
}

fn expiry_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    let expiry = eval.witness.delegation.expiry;
    if eval.now >= expiry {
        return Err(RejectReason::DelegationExpired { now: eval.now, expiry });
    }
    Ok(())
}

fn delegation_signature_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    let delegation = &eval.witness.delegation;
    if !verify(
        &delegation.sender,
        &delegation.canonical_bytes(),
        &eval.witness.delegation_signature,
    ) {
        return Err(RejectReason::InvalidOwnerSignature);
    }
    Ok(())
}

fn witness_binding_gate(eval: &Evaluation<'_>) -> Result<(), RejectReason> {
    if !verify(
        &eval.witness.delegation.receiver,
        eval.outer_id.as_bytes(),
        &eval.witness.session_signature,
    ) {
        return Err(RejectReason::InvalidSessionSignature);
    }
    Ok(())
}
