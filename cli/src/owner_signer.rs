//! Owner signer collaborator
//!
//! The issuer never touches the owner key directly. It hands the canonical
//! delegation bytes to an [`OwnerSigner`] and waits, possibly for a human to
//! approve the request. This allows:
//! 1. A local key loaded from the encrypted keystore ([`LocalOwnerSigner`])
//! 2. An approval step in front of any signer ([`ApprovalGate`])
//! 3. Remote wallets behind some transport, implemented elsewhere

use async_trait::async_trait;
use delegation::{PublicKey, Signature};
use thiserror::Error;

use crate::crypto::OwnerKey;

#[derive(Debug, Error)]
pub enum OwnerSignerError {
    #[error("Owner declined the signing request")]
    Declined,

    #[error("Owner signer unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OwnerSigner: Send + Sync {
    fn public_key(&self) -> PublicKey;

    /// Sign the exact bytes given. May block on user approval.
    async fn sign(&self, message: &[u8]) -> Result<Signature, OwnerSignerError>;
}

/// Signs immediately with an in-memory owner key
#[derive(Debug)]
pub struct LocalOwnerSigner {
    key: OwnerKey,
}

impl LocalOwnerSigner {
    pub fn new(key: OwnerKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl OwnerSigner for LocalOwnerSigner {
    fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, OwnerSignerError> {
        Ok(self.key.sign(message))
    }
}

/// Decides whether a signing request goes ahead
#[async_trait]
pub trait Approver: Send + Sync {
    async fn approve(&self, summary: &str) -> bool;
}

/// Asks on the terminal
pub struct TerminalApprover;

fn read_stdin_line() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

/// Print `prompt` and run `read` on a detached thread
///
/// The runtime never waits on the thread, so dropping the returned future
/// (on timeout or cancellation) leaves nothing blocking shutdown. A line
/// that arrives later is discarded.
pub(crate) async fn ask_on_thread<F>(prompt: String, read: F) -> bool
where
    F: FnOnce() -> std::io::Result<String> + Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("approval-prompt".into())
        .spawn(move || {
            use std::io::Write;
            let mut out = std::io::stderr();
            let _ = write!(out, "{}", prompt);
            let _ = out.flush();
            let _ = tx.send(read());
        });

    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not start approval prompt");
        return false;
    }

    matches!(rx.await, Ok(Ok(line)) if matches!(line.trim(), "y" | "Y" | "yes"))
}

#[async_trait]
impl Approver for TerminalApprover {
    async fn approve(&self, summary: &str) -> bool {
        let prompt = format!("{}\nApprove this delegation? [y/N]: ", summary);
        ask_on_thread(prompt, read_stdin_line).await
    }
}

/// Wraps a signer so every request must be approved first
pub struct ApprovalGate<S, A> {
    inner: S,
    approver: A,
    summary: String,
}

impl<S, A> ApprovalGate<S, A> {
    pub fn new(inner: S, approver: A, summary: impl Into<String>) -> Self {
        Self {
            inner,
            approver,
            summary: summary.into(),
        }
    }
}

#[async_trait]
impl<S: OwnerSigner, A: Approver> OwnerSigner for ApprovalGate<S, A> {
    fn public_key(&self) -> PublicKey {
        self.inner.public_key()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, OwnerSignerError> {
        if !self.approver.approve(&self.summary).await {
            tracing::info!("owner declined delegation request");
            return Err(OwnerSignerError::Declined);
        }
        self.inner.sign(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegation::crypto::verify;

    struct Fixed(bool);

    #[async_trait]
    impl Approver for Fixed {
        async fn approve(&self, _summary: &str) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn test_local_signer_signs() {
        let signer = LocalOwnerSigner::new(OwnerKey::generate());
        let sig = signer.sign(b"delegate").await.unwrap();
        assert!(verify(&signer.public_key(), b"delegate", &sig));
    }

    #[tokio::test]
    async fn test_approval_gate() {
        let key = OwnerKey::from_secret_bytes(&[7u8; 32]);
        let expected = key.public_key();

        let approved = ApprovalGate::new(LocalOwnerSigner::new(key), Fixed(true), "summary");
        assert_eq!(approved.public_key(), expected);
        assert!(approved.sign(b"msg").await.is_ok());

        let declined = ApprovalGate::new(
            LocalOwnerSigner::new(OwnerKey::from_secret_bytes(&[7u8; 32])),
            Fixed(false),
            "summary",
        );
        assert!(matches!(
            declined.sign(b"msg").await,
            Err(OwnerSignerError::Declined)
        ));
    }
}
