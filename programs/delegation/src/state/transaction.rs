//! Outer transaction model and its deterministic identifier
//!
//! id = SHA512/256("TX" || canonical_bytes)
//!
//! Canonical bytes list every field in declaration order. Integers are
//! little-endian, variable-length fields carry a u32 length prefix. The
//! Borsh form is only the transport encoding between tools; it is never
//! hashed or signed.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::{MAX_TX_NOTE_LEN, TX_DOMAIN};
use crate::crypto::hash_with_domain;
use crate::error::{AddressError, TxError, WireError};

/// A 32-byte account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BorshSerialize, BorshDeserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|_| AddressError::Encoding)?;
        let len = bytes.len();
        let arr: [u8; 32] = bytes.try_into().map_err(|_| AddressError::Length(len))?;
        Ok(Self(arr))
    }
}

/// Transaction identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

/// Transaction type marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TxKind {
    Payment,
    ApplicationCall,
    /// Non-value-transferring credential; only valid on delegating transactions
    Delegation,
}

impl TxKind {
    pub fn tag(self) -> u8 {
        match self {
            TxKind::Payment => 0x01,
            TxKind::ApplicationCall => 0x02,
            TxKind::Delegation => 0xD1,
        }
    }
}

/// The transaction a site wants executed from the delegated account
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    pub kind: TxKind,
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub note: Vec<u8>,
    pub network: String,
}

impl Transaction {
    /// Payment with the sender left unset; the session signer fills it in
    pub fn payment(receiver: Address, amount: u64, fee: u64) -> Self {
        Self {
            kind: TxKind::Payment,
            sender: Address::default(),
            receiver,
            amount,
            fee,
            first_valid: 0,
            last_valid: u64::MAX,
            note: Vec::new(),
            network: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), TxError> {
        if self.kind == TxKind::Delegation {
            return Err(TxError::DelegationKind);
        }
        if self.note.len() > MAX_TX_NOTE_LEN {
            return Err(TxError::NoteTooLong(self.note.len()));
        }
        if self.first_valid > self.last_valid {
            return Err(TxError::InvalidValidityWindow {
                first: self.first_valid,
                last: self.last_valid,
            });
        }
        Ok(())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 32 + 32 + 8 * 4 + 8 + self.note.len() + self.network.len());
        out.push(self.kind.tag());
        out.extend_from_slice(&self.sender.0);
        out.extend_from_slice(&self.receiver.0);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.fee.to_le_bytes());
        out.extend_from_slice(&self.first_valid.to_le_bytes());
        out.extend_from_slice(&self.last_valid.to_le_bytes());
        put_var(&mut out, &self.note);
        put_var(&mut out, self.network.as_bytes());
        out
    }

    pub fn id(&self) -> TxId {
        TxId(hash_with_domain(TX_DOMAIN, &[&self.canonical_bytes()]))
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, WireError> {
        Ok(self.try_to_vec()?)
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(Self::try_from_slice(bytes)?)
    }
}

/// Append a u32 length prefix followed by the bytes
pub(crate) fn put_var(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}
