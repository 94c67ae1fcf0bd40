//! Sign an outer transaction with a stored session

use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;
use delegation::{Address, Transaction};

use crate::bundle::WitnessBundle;
use crate::config::Paths;
use crate::crypto::unix_now;
use crate::session::{SessionError, SessionSigner};
use crate::storage::{FileSessionStore, SessionStore};

pub struct SignOptions {
    pub session: String,
    pub to: String,
    pub amount: u64,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub network: String,
    pub note: Option<String>,
    pub out: Option<String>,
}

impl SignOptions {
    /// Unsigned outer payment; the sender is set when signing
    pub fn transaction(&self) -> Result<Transaction> {
        let receiver: Address = self
            .to
            .parse()
            .with_context(|| format!("Invalid receiver address {:?}", self.to))?;

        let mut outer = Transaction::payment(receiver, self.amount, self.fee);
        outer.first_valid = self.first_valid;
        outer.last_valid = self.last_valid;
        outer.network = self.network.clone();
        if let Some(note) = &self.note {
            outer.note = note.as_bytes().to_vec();
        }
        Ok(outer)
    }
}

/// Sign `outer` with the delegation stored under `session_id`
pub fn sign_with_store(
    store: &dyn SessionStore,
    session_id: &str,
    outer: Transaction,
    now: u64,
) -> Result<WitnessBundle> {
    let record = store.get(session_id)?.ok_or(SessionError::MissingDelegation)?;
    let image = record.image()?;

    let mut signer = SessionSigner::new();
    signer.add(record.issued()?);

    let signed = signer.sign(&image, outer, now)?;
    WitnessBundle::new(&image, &signed)
}

pub fn run(paths: &Paths, options: SignOptions) -> Result<()> {
    let outer = options.transaction()?;
    let store = FileSessionStore::new(paths.sessions_dir());
    let bundle = sign_with_store(&store, &options.session, outer, unix_now())?;
    let json = bundle.to_json()?;

    match &options.out {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("{}", "Transaction signed.".green().bold());
            eprintln!("  Sender: {}", bundle.sender);
            eprintln!("  Tx id:  {}", bundle.transaction_id);
            eprintln!("  Bundle: {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
