//! Evaluate a witness bundle the way the ledger would

use std::fs;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use delegation::{AuthorizationPredicate, Verdict};

use crate::bundle::WitnessBundle;
use crate::crypto::unix_now;

/// Decode, route and evaluate a bundle at verifier time `now`
pub fn verify_bundle(bundle: &WitnessBundle, now: u64) -> Result<Verdict> {
    let decoded = bundle.decode()?;
    decoded.check_routing()?;

    let predicate = AuthorizationPredicate::new(&decoded.image);
    Ok(predicate.evaluate(&decoded.transaction, &decoded.witness, now))
}

pub fn run(bundle_path: &str, now: Option<u64>) -> Result<()> {
    let json = fs::read_to_string(bundle_path)
        .with_context(|| format!("Failed to read {}", bundle_path))?;
    let bundle = WitnessBundle::from_json(&json)?;
    let now = now.unwrap_or_else(unix_now);

    match verify_bundle(&bundle, now)? {
        Verdict::Approve => {
            println!("{}", "APPROVED".green().bold());
            println!("  Tx id:  {}", bundle.transaction_id);
            println!("  Sender: {}", bundle.sender);
            Ok(())
        }
        Verdict::Reject(reason) => {
            println!("{}", "REJECTED".red().bold());
            println!("  {}", reason);
            bail!("Transaction not authorized")
        }
    }
}
