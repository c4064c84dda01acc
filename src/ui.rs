// UI layer: everything that talks to the terminal. Prompts use `dialoguer`,
// the upload progress uses `indicatif` and the summary is coloured with
// `crossterm` when stdout is a terminal.

use crate::api::UploadedImage;
use crate::upload::UploadSummary;
use anyhow::Result;
use crossterm::style::{style, Stylize};
use crossterm::tty::IsTty;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

/// Progress bar over the files of a run. Hidden with `--quiet`; indicatif
/// also hides it on its own when stderr is not a terminal.
pub fn progress_bar(total: usize, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} [{pos}/{len}] {wide_msg}",
    )?);
    Ok(bar)
}

/// Show the authorization address and read the PIN the user copies back.
pub fn prompt_pin(authorize_url: &str) -> Result<String> {
    println!("Open this address in a browser and allow access:");
    println!();
    println!("  {authorize_url}");
    println!();
    let pin: String = Input::new().with_prompt("PIN").interact_text()?;
    Ok(pin)
}

pub fn confirm_logout() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Forget the stored account?")
        .default(false)
        .interact()?)
}

/// Output format of the upload summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Print the summary to stdout.
pub fn print_summary(summary: &UploadSummary, format: Format) -> Result<()> {
    let stdout = io::stdout();
    let color = stdout.is_tty();
    let mut out = stdout.lock();
    write_summary(&mut out, summary, format, color)?;
    Ok(())
}

/// Print what made it up before a run failed.
pub fn print_partial(uploaded: &[UploadedImage]) -> Result<()> {
    if uploaded.is_empty() {
        return Ok(());
    }
    let stderr = io::stderr();
    let color = stderr.is_tty();
    let mut out = stderr.lock();
    writeln!(out, "Uploaded before the failure:")?;
    for image in uploaded {
        write_image(&mut out, image, color)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &UploadSummary,
    format: Format,
    color: bool,
) -> Result<()> {
    if format == Format::Json {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        writeln!(out)?;
        return Ok(());
    }

    for image in &summary.images {
        write_image(out, image, color)?;
    }

    if let Some(album) = &summary.album {
        let label = if album.created { "New album" } else { "Album" };
        let location = album
            .link
            .as_deref()
            .or(album.deletehash.as_deref())
            .unwrap_or("(unknown)");
        if color {
            writeln!(out, "{}: {}", style(label).bold(), style(location).green())?;
        } else {
            writeln!(out, "{label}: {location}")?;
        }
        if album.created {
            if let Some(hash) = &album.deletehash {
                let line = format!("  album deletehash: {hash}");
                if color {
                    writeln!(out, "{}", style(line).dim())?;
                } else {
                    writeln!(out, "{line}")?;
                }
            }
        }
    }
    Ok(())
}

fn write_image<W: Write>(out: &mut W, image: &UploadedImage, color: bool) -> io::Result<()> {
    let extra = image
        .deletehash
        .as_deref()
        .map(|hash| format!(" (deletehash {hash})"))
        .unwrap_or_default();
    if color {
        writeln!(out, "{}{}", style(&image.link).green(), style(extra).dim())
    } else {
        writeln!(out, "{}{}", image.link, extra)
    }
}
