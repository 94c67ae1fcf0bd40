//! Contract template instantiation
//!
//! The authorization program is a fixed template with two constants baked
//! in: the owner key set and the origin. Image layout:
//!
//! TEMPLATE_MAGIC (7) || TEMPLATE_VERSION (1)
//!     || owners_len (1) || owners (32 * n)
//!     || origin_len (1) || origin
//!     || PREDICATE_PROGRAM
//!
//! address = SHA512/256("Program" || image)
//!
//! Instantiation is pure: no clock, no randomness, no caching.

use subtle::{Choice, ConstantTimeEq};

use crate::constants::{
    MAX_ORIGIN_LEN, MAX_OWNERS_LEN, PROGRAM_DOMAIN, PUBKEY_LEN, TEMPLATE_MAGIC, TEMPLATE_VERSION,
};
use crate::crypto::{hash_with_domain, validate_owner_key, PublicKey};
use crate::error::TemplateError;
use crate::state::note::Origin;
use crate::state::transaction::Address;

/// Gate opcodes of the authorization program, in evaluation order
pub const PREDICATE_PROGRAM: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

/// Ordered set of keys entitled to authorize delegation
///
/// The first key is the primary owner, the rest are recovery keys.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OwnerKeySet(Vec<PublicKey>);

impl OwnerKeySet {
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[PublicKey] {
        &self.0
    }

    pub fn primary(&self) -> Option<&PublicKey> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenation of the 32-byte keys, in order
    pub fn serialize(&self) -> Vec<u8> {
        self.0.iter().flat_map(|k| k.0).collect()
    }

    pub fn serialized_len(&self) -> usize {
        self.0.len() * PUBKEY_LEN
    }

    /// Membership test that touches every key regardless of where it matches
    pub fn contains(&self, key: &PublicKey) -> bool {
        let mut found = Choice::from(0u8);
        for owner in &self.0 {
            found |= owner.0[..].ct_eq(&key.0[..]);
        }
        found.into()
    }
}

impl From<Vec<PublicKey>> for OwnerKeySet {
    fn from(keys: Vec<PublicKey>) -> Self {
        Self(keys)
    }
}

/// Deterministic program image bound to (owners, origin)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractImage {
    bytes: Vec<u8>,
    owners: OwnerKeySet,
    origin: Origin,
}

impl ContractImage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn owners(&self) -> &OwnerKeySet {
        &self.owners
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn address(&self) -> Address {
        derive_address(self)
    }

    /// Parse a stored image and re-derive it from its bound parameters
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let mut cursor = bytes;

        let magic = take(&mut cursor, TEMPLATE_MAGIC.len())?;
        if magic != TEMPLATE_MAGIC {
            return Err(TemplateError::MalformedImage);
        }
        if take(&mut cursor, 1)?[0] != TEMPLATE_VERSION {
            return Err(TemplateError::MalformedImage);
        }

        let owners_len = take(&mut cursor, 1)?[0] as usize;
        if owners_len % PUBKEY_LEN != 0 {
            return Err(TemplateError::MalformedImage);
        }
        let owners = take(&mut cursor, owners_len)?
            .chunks_exact(PUBKEY_LEN)
            .map(|chunk| {
                let mut key = [0u8; PUBKEY_LEN];
                key.copy_from_slice(chunk);
                PublicKey(key)
            })
            .collect::<Vec<_>>();

        let origin_len = take(&mut cursor, 1)?[0] as usize;
        let origin = Origin::new(take(&mut cursor, origin_len)?);

        let image = instantiate(&OwnerKeySet::new(owners), &origin)?;
        if image.bytes != bytes {
            return Err(TemplateError::MalformedImage);
        }
        Ok(image)
    }
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Result<&'a [u8], TemplateError> {
    if cursor.len() < n {
        return Err(TemplateError::MalformedImage);
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}

/// Check owner set and origin against the template's limits
pub fn check_template_params(owners: &OwnerKeySet, origin: &Origin) -> Result<(), TemplateError> {
    if owners.serialized_len() > MAX_OWNERS_LEN {
        return Err(TemplateError::Oversize {
            field: "owners",
            len: owners.serialized_len(),
            max: MAX_OWNERS_LEN,
        });
    }
    if origin.len() > MAX_ORIGIN_LEN {
        return Err(TemplateError::Oversize {
            field: "origin",
            len: origin.len(),
            max: MAX_ORIGIN_LEN,
        });
    }
    Ok(())
}

/// Bind owners and origin into the authorization program
pub fn instantiate(owners: &OwnerKeySet, origin: &Origin) -> Result<ContractImage, TemplateError> {
    check_template_params(owners, origin)?;

    if owners.is_empty() {
        return Err(TemplateError::EmptyOwnerSet);
    }
    for (i, key) in owners.keys().iter().enumerate() {
        if !validate_owner_key(key) {
            return Err(TemplateError::InvalidOwnerKey);
        }
        if owners.keys()[..i].contains(key) {
            return Err(TemplateError::DuplicateOwner);
        }
    }

    let owner_bytes = owners.serialize();
    let mut bytes = Vec::with_capacity(
        TEMPLATE_MAGIC.len() + 3 + owner_bytes.len() + origin.len() + PREDICATE_PROGRAM.len(),
    );
    bytes.extend_from_slice(TEMPLATE_MAGIC);
    bytes.push(TEMPLATE_VERSION);
    bytes.push(owner_bytes.len() as u8);
    bytes.extend_from_slice(&owner_bytes);
    bytes.push(origin.len() as u8);
    bytes.extend_from_slice(origin.as_bytes());
    bytes.extend_from_slice(PREDICATE_PROGRAM);

    Ok(ContractImage {
        bytes,
        owners: owners.clone(),
        origin: origin.clone(),
    })
}

/// Account address of an image
pub fn derive_address(image: &ContractImage) -> Address {
    Address(hash_with_domain(PROGRAM_DOMAIN, &[&image.bytes]))
}
