use thiserror::Error;

/// Errors raised while binding owners and origin into a contract image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template parameter too large - {field} is {len} bytes, max {max}")]
    Oversize {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Owner key set is empty - at least one owner is required")]
    EmptyOwnerSet,

    #[error("Owner key set contains a duplicate key")]
    DuplicateOwner,

    #[error("Invalid owner key - not a usable Ed25519 public key")]
    InvalidOwnerKey,

    #[error("Malformed contract image")]
    MalformedImage,
}

/// Errors decoding the origin note carried by a delegating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("Note too short - {0} bytes")]
    TooShort(usize),

    #[error("Note tag mismatch - not an origin note")]
    BadTag,

    #[error("Unsupported note version {0}")]
    UnsupportedVersion(u8),

    #[error("Origin too long - {0} bytes, max 64")]
    OriginTooLong(usize),

    #[error("Note length mismatch - declared {declared}, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// Structural problems with an outer transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("Transaction note too long - {0} bytes, max 1024")]
    NoteTooLong(usize),

    #[error("Invalid validity window - first valid {first} is after last valid {last}")]
    InvalidValidityWindow { first: u64, last: u64 },

    #[error("Delegation marker is not a valid outer transaction kind")]
    DelegationKind,
}

/// Failures parsing a base58 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid base58 address encoding")]
    Encoding,

    #[error("Invalid address length: expected 32 bytes, got {0}")]
    Length(usize),
}

/// Wire (Borsh) encoding failures.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Wire encoding error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the authorization predicate rejected a transaction.
///
/// These reasons are for the implementer's diagnostics only. The protocol
/// boundary ([`crate::predicate::AuthorizationPredicate::approve`]) collapses
/// every variant into a single `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("Template parameters exceed the size limit")]
    Oversize,

    #[error("Delegating transaction is not a zero-value delegation marker")]
    MalformedDelegation,

    #[error("Delegation note is malformed: {0}")]
    MalformedNote(NoteError),

    #[error("Delegated origin does not match the bound origin")]
    OriginMismatch,

    #[error("Delegation sender is not in the owner key set")]
    UnauthorizedSender,

    #[error("Delegation expired - now {now}, expiry {expiry}")]
    DelegationExpired { now: u64, expiry: u64 },

    #[error("Owner signature over the delegation is invalid")]
    InvalidOwnerSignature,

    #[error("Session signature over the transaction id is invalid")]
    InvalidSessionSignature,
}
