//! Durable credential storage
//!
//! Manages a JSON file holding the single credential pair for this
//! installation. All writes use atomic temp-file + rename to prevent
//! corruption on crash. A tokio Mutex serializes concurrent writes from the
//! replay path and the refresh coordinator.
//!
//! The vault file is the single source of truth for credential data: it is
//! what makes a session survive a process restart. Both entries are always
//! written together and cleared together.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::token::Token;

/// The stored credential pair.
///
/// `access` authorizes protected requests; `renewal` is exchanged for a new
/// access credential when the old one expires. A pair without a renewal
/// credential forces session termination on the first expiry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal: Option<Token>,
}

impl CredentialPair {
    /// Whether neither credential is present.
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.renewal.is_none()
    }
}

/// Thread-safe credential file manager.
///
/// The Mutex serializes all writes. Reads acquire the lock briefly to clone
/// the in-memory state, so request-time reads don't block on refresh writes.
pub struct CredentialVault {
    path: PathBuf,
    state: Mutex<CredentialPair>,
}

impl CredentialVault {
    /// Load the credential pair from the given file path.
    ///
    /// If the file doesn't exist, creates it holding an empty pair (cold
    /// start with no session). The client stays unauthenticated until a
    /// pair is installed after login.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            let pair: CredentialPair = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing credential file: {e}")))?;
            info!(path = %path.display(), authenticated = pair.access.is_some(), "loaded credentials");
            pair
        } else {
            info!(path = %path.display(), "credential file not found, starting unauthenticated");
            let pair = CredentialPair::default();
            // Create the empty file so future loads don't need the cold-start path
            write_atomic(&path, &pair).await?;
            pair
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Get a clone of the access credential, if present.
    pub async fn access(&self) -> Option<Token> {
        let state = self.state.lock().await;
        state.access.clone()
    }

    /// Get a clone of the renewal credential, if present.
    pub async fn renewal(&self) -> Option<Token> {
        let state = self.state.lock().await;
        state.renewal.clone()
    }

    /// Whether a renewal credential is stored.
    pub async fn has_renewal(&self) -> bool {
        let state = self.state.lock().await;
        state.renewal.is_some()
    }

    /// Whether the vault holds no credentials at all.
    pub async fn is_empty(&self) -> bool {
        let state = self.state.lock().await;
        state.is_empty()
    }

    /// Install a full credential pair (after login) and persist to disk.
    ///
    /// Replaces whatever was stored before. A `None` renewal credential is
    /// valid: the session then ends on the first access expiry.
    pub async fn install(&self, access: Token, renewal: Option<Token>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.access = Some(access);
        state.renewal = renewal;
        debug!("installed credential pair");
        write_atomic(&self.path, &state).await
    }

    /// Update credentials after a successful renewal.
    ///
    /// The access credential is always replaced. The renewal credential is
    /// replaced only when the endpoint rotated it; otherwise the stored one
    /// remains valid and is kept.
    pub async fn rotate(&self, access: Token, renewal: Option<Token>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.access = Some(access);
        if renewal.is_some() {
            state.renewal = renewal;
        }
        debug!("rotated credentials after renewal");
        write_atomic(&self.path, &state).await
    }

    /// Remove both credentials in one atomic write (session termination).
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = CredentialPair::default();
        debug!("cleared credential vault");
        write_atomic(&self.path, &state).await
    }
}

/// Write the credential pair to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only) since the file
/// contains session credentials.
async fn write_atomic(path: &Path, pair: &CredentialPair) -> Result<()> {
    let json = serde_json::to_string_pretty(pair)
        .map_err(|e| Error::CredentialParse(format!("serializing credentials: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}
