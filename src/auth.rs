// Account authorization: turning a PIN into stored credentials and keeping
// the access token fresh. The interactive prompt lives in `ui`.

use crate::api::{ImgurClient, Token};
use crate::credentials::Credentials;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

fn credentials_from_token(
    client_id: &str,
    client_secret: &str,
    token: Token,
    now: DateTime<Utc>,
) -> Result<Credentials> {
    let expires_at = Duration::try_seconds(token.expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .context("token lifetime out of range")?;
    Ok(Credentials {
        client_id: client_id.to_string(),
        client_secret: Some(client_secret.to_string()),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
        account_username: token.account_username,
    })
}

/// Exchange a PIN for tokens and build the credentials to store.
pub fn login(
    client: &ImgurClient,
    client_id: &str,
    client_secret: &str,
    pin: &str,
    now: DateTime<Utc>,
) -> Result<Credentials> {
    let token = client
        .exchange_pin(client_id, client_secret, pin.trim())
        .context("Failed to exchange PIN for an access token")?;
    let creds = credentials_from_token(client_id, client_secret, token, now)?;
    info!(account = ?creds.account_username, "logged in");
    Ok(creds)
}

/// Refresh the access token when it is about to expire. Returns the new
/// credentials (which the caller must store) or `None` when the current
/// token is still good.
pub fn ensure_fresh(
    client: &ImgurClient,
    creds: &Credentials,
    now: DateTime<Utc>,
) -> Result<Option<Credentials>> {
    if !creds.is_expired(now) {
        return Ok(None);
    }
    let secret = creds
        .client_secret
        .as_deref()
        .context("Access token expired and no client secret is stored; run `imgup login` again")?;

    info!("access token expired, refreshing");
    let token = client
        .refresh_token(&creds.client_id, secret, &creds.refresh_token)
        .context("Failed to refresh the access token; run `imgup login` again")?;
    let mut refreshed = credentials_from_token(&creds.client_id, secret, token, now)?;
    if refreshed.account_username.is_none() {
        refreshed.account_username = creds.account_username.clone();
    }
    Ok(Some(refreshed))
}
