//! Issue a delegation for an origin and store the session

use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;
use delegation::ContractImage;

use crate::commands::local_image;
use crate::config::{default_session_id, Paths};
use crate::crypto::unix_now;
use crate::issuer::authenticate;
use crate::owner_signer::{ApprovalGate, LocalOwnerSigner, OwnerSigner, TerminalApprover};
use crate::secure_storage::{prompt_password, OwnerKeyStore};
use crate::storage::{FileSessionStore, SessionRecord, SessionStore};

pub struct AuthenticateOptions {
    pub origin: String,
    pub recovery: Vec<String>,
    /// Delegation lifetime in seconds
    pub ttl: u64,
    /// Seconds to wait for owner approval
    pub timeout: u64,
    pub session: Option<String>,
}

/// Ask `signer` for a delegation on `image` and persist it under `session_id`
///
/// Returns the delegation expiry.
pub async fn open_session<S>(
    store: &dyn SessionStore,
    signer: &S,
    image: &ContractImage,
    session_id: &str,
    ttl: u64,
    now: u64,
    approval_timeout: Duration,
) -> Result<u64>
where
    S: OwnerSigner + ?Sized,
{
    if !image.owners().contains(&signer.public_key()) {
        bail!(
            "Signer {} is not an owner of contract {}",
            signer.public_key(),
            image.address()
        );
    }

    let issued = authenticate(signer, image.origin(), ttl, now, approval_timeout).await?;
    let record = SessionRecord::new(image, &issued)?;
    store.put(session_id, &record)?;

    tracing::info!(session = session_id, address = %image.address(), expiry = record.expiry, "session stored");

    Ok(record.expiry)
}

pub async fn run(paths: &Paths, options: AuthenticateOptions) -> Result<()> {
    let image = local_image(paths, &options.origin, &options.recovery)?;
    let session_id = options
        .session
        .unwrap_or_else(|| default_session_id(image.origin()));

    println!("{}", "=== Delegate Authentication ===".cyan().bold());
    println!();
    println!("  Origin:   {}", image.origin());
    println!("  Contract: {}", image.address());
    println!("  Lifetime: {}s", options.ttl);
    println!();

    let password = prompt_password("Enter owner key password: ")?;
    let key = OwnerKeyStore::new(paths.owner_key_file()).load(&password)?;

    let summary = format!(
        "Site {} requests a session on {} for {} seconds.",
        image.origin(),
        image.address(),
        options.ttl
    );
    let signer = ApprovalGate::new(LocalOwnerSigner::new(key), TerminalApprover, summary);

    let store = FileSessionStore::new(paths.sessions_dir());
    let now = unix_now();
    let expiry = open_session(
        &store,
        &signer,
        &image,
        &session_id,
        options.ttl,
        now,
        Duration::from_secs(options.timeout),
    )
    .await?;

    let expires_at = chrono::DateTime::from_timestamp(expiry as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| expiry.to_string());

    println!();
    println!("{}", "Session opened.".green().bold());
    println!("  Session: {}", session_id);
    println!("  Expires: {}", expires_at);
    println!();
    println!(
        "{}",
        format!("Sign with 'delegate sign --session {} ...'", session_id).dimmed()
    );

    Ok(())
}
