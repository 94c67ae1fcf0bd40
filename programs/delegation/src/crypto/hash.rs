use sha2::{Digest, Sha512_256};

/// Domain-separated SHA-512/256
///
/// digest = SHA512/256(domain || part_0 || part_1 || ...)
pub fn hash_with_domain(domain: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}
