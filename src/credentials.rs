// Persisted account credentials. Stored as a small JSON document in the
// user's config directory so a `login` survives between runs.

use crate::error::CredentialsError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_username: Option<String>,
}

impl Credentials {
    /// Overflowing timestamps count as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self
            .expires_at
            .checked_sub_signed(Duration::seconds(EXPIRY_MARGIN_SECS))
        {
            Some(deadline) => deadline <= now,
            None => true,
        }
    }
}

/// Default location: `<config dir>/imgup/credentials.json`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("imgup"))
        .unwrap_or_else(|| PathBuf::from(".imgup"))
        .join("credentials.json")
}

/// Load credentials; a missing file means "not logged in".
pub fn load(path: &Path) -> Result<Option<Credentials>, CredentialsError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored credentials");
            return Ok(None);
        }
        Err(source) => {
            return Err(CredentialsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let creds = serde_json::from_str(&data).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(creds))
}

/// Write credentials, creating the parent directory if needed. On Unix the
/// file is readable by its owner only.
pub fn save(path: &Path, creds: &Credentials) -> Result<(), CredentialsError> {
    let io_err = |source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let data = serde_json::to_string_pretty(creds).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(io_err)?;
    restrict_permissions(path).map_err(io_err)?;
    debug!(path = %path.display(), "saved credentials");
    Ok(())
}

/// Delete stored credentials. Returns whether there was anything to delete.
pub fn remove(path: &Path) -> Result<bool, CredentialsError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
