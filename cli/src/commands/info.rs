//! Show configuration, owner key and sessions

use anyhow::Result;
use colored::Colorize;

use crate::config::Paths;
use crate::crypto::unix_now;
use crate::secure_storage::OwnerKeyStore;
use crate::storage::{FileSessionStore, SessionStore};

pub fn run(paths: &Paths) -> Result<()> {
    println!();
    println!("{}", "Delegate Configuration".yellow().bold());
    println!();

    println!("{}:", "Data Directory".cyan());
    println!("  {}", paths.root().display());
    println!();

    let keystore = OwnerKeyStore::new(paths.owner_key_file());
    match keystore.public_key() {
        Ok(owner) => {
            println!("{}", "Owner Key: CONFIGURED".green());
            println!("  {}", owner);
        }
        Err(_) => {
            println!("{}", "Owner Key: NOT CONFIGURED".red());
            println!("  Run 'delegate keygen' to generate one");
        }
    }
    println!();

    println!("{}:", "Sessions".cyan());
    let store = FileSessionStore::new(paths.sessions_dir());
    let ids = store.list()?;
    if ids.is_empty() {
        println!("  {}", "(none)".dimmed());
    }

    let now = unix_now();
    for id in ids {
        match store.get(&id) {
            Ok(Some(record)) if now < record.expiry => {
                println!(
                    "  {} {} ({}s left)",
                    id,
                    record.origin,
                    record.expiry - now
                );
            }
            Ok(Some(record)) => {
                println!("  {} {} {}", id, record.origin, "expired".red());
            }
            Ok(None) => {}
            Err(e) => println!("  {} {}", id, format!("unreadable: {}", e).red()),
        }
    }
    println!();

    println!("{}:", "File Locations".cyan());
    println!("  Owner key: {}", paths.owner_key_file().display());
    println!("  Sessions:  {}", paths.sessions_dir().display());

    Ok(())
}
