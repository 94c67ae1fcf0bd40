//! Configuration and file locations for the delegate CLI

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use delegation::{Origin, OwnerKeySet, PublicKey};

/// Default data directory under the user's home
const DATA_DIR: &str = ".delegate";
const OWNER_KEY_FILE: &str = "owner.enc";
const SESSIONS_DIR: &str = "sessions";

/// Default delegation lifetime
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// How long to wait for the owner to approve a delegation
pub const DEFAULT_APPROVAL_TIMEOUT_SECS: u64 = 120;

/// Maximum session id length
const MAX_SESSION_ID_LEN: usize = 64;

/// Resolved data locations
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Use `home` if given, otherwise `~/.delegate`
    pub fn resolve(home: Option<&str>) -> Result<Self> {
        let root = match home {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .context("Could not find home directory")?
                .join(DATA_DIR),
        };
        Ok(Self { root })
    }

    pub fn from_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn owner_key_file(&self) -> PathBuf {
        self.root.join(OWNER_KEY_FILE)
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join(SESSIONS_DIR)
    }
}

/// Write a file readable only by the current user
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    // An existing file keeps its old mode on open; tighten it before writing
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)
        .with_context(|| format!("Failed to write {:?}", path))?;

    Ok(())
}

/// Session ids become file names: keep them boring
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
        bail!("Session id must be 1-{} characters", MAX_SESSION_ID_LEN);
    }
    if id.starts_with('.') {
        bail!("Session id cannot start with '.'");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        bail!("Session id may only contain letters, digits, '-', '_' and '.'");
    }
    Ok(())
}

/// Parse a hex-encoded public key
pub fn parse_public_key(input: &str) -> Result<PublicKey> {
    match PublicKey::from_hex(input) {
        Some(key) => Ok(key),
        None => bail!("Invalid public key {:?}: expected 32 bytes of hex", input),
    }
}

/// Owner set: the local owner first, then any recovery keys
pub fn owner_set(primary: PublicKey, recovery: &[String]) -> Result<OwnerKeySet> {
    let mut keys = vec![primary];
    for hex_key in recovery {
        keys.push(parse_public_key(hex_key)?);
    }
    Ok(OwnerKeySet::new(keys))
}

/// Default session id for an origin: its text with unsafe characters replaced
pub fn default_session_id(origin: &Origin) -> String {
    let id: String = origin
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_SESSION_ID_LEN)
        .collect();
    if id.is_empty() {
        "default".to_string()
    } else {
        id
    }
}
