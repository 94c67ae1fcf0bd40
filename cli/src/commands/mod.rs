pub mod address;
pub mod authenticate;
pub mod info;
pub mod keygen;
pub mod logout;
pub mod sign;
pub mod verify;

use anyhow::Result;
use delegation::{instantiate, ContractImage, Origin};

use crate::config::{owner_set, Paths};
use crate::secure_storage::OwnerKeyStore;

/// Contract image for the local owner (plus recovery keys) and `origin`
pub(crate) fn local_image(paths: &Paths, origin: &str, recovery: &[String]) -> Result<ContractImage> {
    let store = OwnerKeyStore::new(paths.owner_key_file());
    let owners = owner_set(store.public_key()?, recovery)?;
    Ok(instantiate(&owners, &Origin::from(origin))?)
}
