//! Owner key generation with encrypted storage

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::Paths;
use crate::crypto::OwnerKey;
use crate::secure_storage::{prompt_new_password, OwnerKeyStore};

pub fn run(paths: &Paths, force: bool) -> Result<()> {
    let store = OwnerKeyStore::new(paths.owner_key_file());

    if store.exists() && !force {
        bail!(
            "Owner key already exists. Use --force to overwrite.\n\
             Warning: Overwriting the key changes every contract address derived from it!"
        );
    }

    println!("{}", "=== Delegate Owner Key Generation ===".cyan().bold());
    println!();
    println!("{}", "Choose a strong password to encrypt your owner key.".cyan());
    println!("{}", "Requirements: 8+ chars, uppercase, lowercase, and numbers".dimmed());
    println!();

    let password = prompt_new_password("Enter password: ")?;

    let key = OwnerKey::generate();
    store.save(&key, &password)?;

    tracing::info!(owner = %key.public_key(), path = ?store.path(), "owner key generated");

    println!();
    println!("{}", "Owner key generated and encrypted.".green().bold());
    println!();
    println!("{}:", "Owner public key".cyan());
    println!("  {}", key.public_key());
    println!();
    println!("{}:", "Stored at".cyan());
    println!("  {}", store.path().display());
    println!();
    println!(
        "{}",
        "Next: 'delegate address --origin <site>' to derive a contract account.".dimmed()
    );

    Ok(())
}
