// Command handlers: glue between the parsed command line, the library
// modules and the terminal.

use crate::api::{Auth, ImgurClient};
use crate::cli::{Cli, Command, LoginArgs, UploadArgs};
use crate::credentials;
use crate::error::{SettingsError, UploadError};
use crate::settings::Settings;
use crate::ui::{self, Format};
use crate::{auth, upload};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

/// Run the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Upload(args) => upload(cli, args),
        Command::Login(args) => login(cli, args),
        Command::Logout { yes } => logout(cli, *yes),
    }
}

fn upload(cli: &Cli, args: &UploadArgs) -> Result<()> {
    // Checked before anything else so bad paths never cost a request.
    let plan = args.plan()?;

    let mut settings = Settings::resolve(
        &cli.api_url,
        cli.client_id.as_deref(),
        cli.credentials.clone(),
        args.anonymous,
    )?;

    if let Some(account) = &settings.account {
        let token_client = ImgurClient::new(
            &settings.api_url,
            Auth::Anonymous {
                client_id: settings.client_id.clone(),
            },
        )?;
        if let Some(fresh) = auth::ensure_fresh(&token_client, account, Utc::now())? {
            credentials::save(&settings.credentials_path, &fresh)
                .context("Failed to store refreshed credentials")?;
            settings.account = Some(fresh);
        }
    }

    match &settings.account {
        Some(account) => info!(account = ?account.account_username, files = plan.files.len(), "uploading to account"),
        None => info!(files = plan.files.len(), "uploading anonymously"),
    }

    let client = ImgurClient::new(&settings.api_url, settings.auth())?;
    let progress = ui::progress_bar(plan.files.len(), args.quiet)?;

    match upload::run(&client, &plan, &progress) {
        Ok(summary) => {
            let format = if args.json { Format::Json } else { Format::Text };
            ui::print_summary(&summary, format)
        }
        Err(err) => {
            progress.abandon();
            if let UploadError::Image { uploaded, .. } = &err {
                ui::print_partial(uploaded)?;
            }
            Err(err.into())
        }
    }
}

fn login(cli: &Cli, args: &LoginArgs) -> Result<()> {
    let client_id = cli
        .client_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(SettingsError::MissingClientId)?;
    let client_secret = args
        .client_secret
        .as_deref()
        .map(str::trim)
        .filter(|secret| !secret.is_empty())
        .ok_or(SettingsError::MissingClientSecret)?;
    let path = cli.credentials.clone().unwrap_or_else(credentials::default_path);

    let client = ImgurClient::new(
        &cli.api_url,
        Auth::Anonymous {
            client_id: client_id.to_string(),
        },
    )?;
    let pin = match &args.pin {
        Some(pin) => pin.clone(),
        None => ui::prompt_pin(&client.authorize_url(client_id)?)?,
    };

    let creds = auth::login(&client, client_id, client_secret, &pin, Utc::now())?;
    credentials::save(&path, &creds)?;
    match &creds.account_username {
        Some(name) => println!("Logged in as {name}."),
        None => println!("Logged in."),
    }
    Ok(())
}

fn logout(cli: &Cli, yes: bool) -> Result<()> {
    let path = cli.credentials.clone().unwrap_or_else(credentials::default_path);
    if !yes && !ui::confirm_logout()? {
        return Ok(());
    }
    if credentials::remove(&path)? {
        println!("Stored account removed.");
    } else {
        println!("No account was stored.");
    }
    Ok(())
}
