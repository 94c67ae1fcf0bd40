/// Maximum serialized size of the owner key set bound into an image
pub const MAX_OWNERS_LEN: usize = 64;

/// Maximum origin length bound into an image
pub const MAX_ORIGIN_LEN: usize = 64;

/// Maximum note length on an outer transaction
pub const MAX_TX_NOTE_LEN: usize = 1024;

/// Ed25519 public key length
pub const PUBKEY_LEN: usize = 32;

/// Ed25519 signature length
pub const SIGNATURE_LEN: usize = 64;

/// Domain separator for program addresses
pub const PROGRAM_DOMAIN: &[u8] = b"Program";

/// Domain separator for outer transaction ids
pub const TX_DOMAIN: &[u8] = b"TX";

/// Domain separator for the canonical bytes of a delegating transaction
pub const DELEGATION_DOMAIN: &[u8] = b"DLGTX";

/// Magic prefix of a contract image
pub const TEMPLATE_MAGIC: &[u8] = b"DLGPROG";

/// Contract template revision
pub const TEMPLATE_VERSION: u8 = 1;

/// Tag prefix of an origin note
pub const NOTE_TAG: &[u8] = b"DLGO";

/// Origin note format revision
pub const NOTE_VERSION: u8 = 1;
