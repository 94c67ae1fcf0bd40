//! End a session by discarding its ephemeral key

use anyhow::Result;
use colored::Colorize;

use crate::config::Paths;
use crate::storage::{FileSessionStore, SessionStore};

pub fn run(paths: &Paths, session: &str) -> Result<()> {
    let store = FileSessionStore::new(paths.sessions_dir());

    if store.remove(session)? {
        tracing::info!(session, "session removed");
        println!("{} {}", "Session ended:".green(), session);
    } else {
        println!("{} {}", "No such session:".yellow(), session);
    }

    Ok(())
}
