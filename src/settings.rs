// Runtime settings. Precedence: command-line flag, then environment (both
// handled by clap), then the stored credentials file, then defaults.

use crate::api::Auth;
use crate::credentials::{self, Credentials};
use crate::error::SettingsError;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub client_id: String,
    pub credentials_path: PathBuf,
    /// Stored account, unless anonymous uploads were requested.
    pub account: Option<Credentials>,
}

impl Settings {
    pub fn resolve(
        api_url: &str,
        client_id: Option<&str>,
        credentials_path: Option<PathBuf>,
        anonymous: bool,
    ) -> Result<Self, SettingsError> {
        let credentials_path = credentials_path.unwrap_or_else(credentials::default_path);
        let stored = credentials::load(&credentials_path)?;

        let client_id = client_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| stored.as_ref().map(|c| c.client_id.clone()))
            .ok_or(SettingsError::MissingClientId)?;

        let account = if anonymous {
            debug!("anonymous upload requested, ignoring stored account");
            None
        } else {
            stored
        };

        Ok(Settings {
            api_url: api_url.trim_end_matches('/').to_string(),
            client_id,
            credentials_path,
            account,
        })
    }

    pub fn auth(&self) -> Auth {
        match &self.account {
            Some(creds) => Auth::Bearer {
                access_token: creds.access_token.clone(),
            },
            None => Auth::Anonymous {
                client_id: self.client_id.clone(),
            },
        }
    }
}
