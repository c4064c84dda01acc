// Command-line surface. Flags fall back to environment variables where it
// makes sense so the client id and secret do not have to be typed.

use crate::api::DEFAULT_API_URL;
use crate::error::ValidationError;
use crate::validate::{self, ImageMeta, NewAlbum, Privacy, UploadPlan};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Upload images to Imgur, optionally into a new or existing album.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Credentials file [default: <config dir>/imgup/credentials.json]
    #[arg(long, value_name = "PATH", global = true)]
    pub credentials: Option<PathBuf>,

    /// Base address of the API
    #[arg(long, env = "IMGUP_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Application client id
    #[arg(long, env = "IMGUR_CLIENT_ID", hide_env_values = true, global = true)]
    pub client_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload one or more images
    #[command(alias = "up")]
    Upload(UploadArgs),
    /// Authorize uploads to your account
    Login(LoginArgs),
    /// Forget the stored account
    Logout {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image files, uploaded in the order given
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Add to an existing album (its deletehash when uploading anonymously)
    #[arg(short, long, value_name = "ID", conflicts_with = "create_album")]
    pub album: Option<String>,

    /// Create a new album for the images
    #[arg(short = 'c', long)]
    pub create_album: bool,

    /// Title of the new album
    #[arg(long, value_name = "TITLE", requires = "create_album")]
    pub album_title: Option<String>,

    /// Description of the new album
    #[arg(long, value_name = "TEXT", requires = "create_album")]
    pub album_description: Option<String>,

    /// Visibility of the new album
    #[arg(long, value_enum, requires = "create_album")]
    pub privacy: Option<Privacy>,

    /// Title for every image
    #[arg(short, long)]
    pub title: Option<String>,

    /// Description for every image
    #[arg(short, long)]
    pub description: Option<String>,

    /// Upload anonymously even if an account is stored
    #[arg(long)]
    pub anonymous: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not show a progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl UploadArgs {
    /// Validate the arguments into an upload plan.
    pub fn plan(&self) -> Result<UploadPlan, ValidationError> {
        let new_album = self.create_album.then(|| NewAlbum {
            title: self.album_title.clone(),
            description: self.album_description.clone(),
            privacy: self.privacy,
        });
        validate::build_plan(
            &self.files,
            self.album.as_deref(),
            new_album,
            ImageMeta {
                title: self.title.clone(),
                description: self.description.clone(),
            },
        )
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Application client secret
    #[arg(long, env = "IMGUR_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// PIN from the authorization page; prompted for when missing
    #[arg(long)]
    pub pin: Option<String>,
}

/// Exit status for a failed parse: usage errors exit 1 like every other
/// failure, `--help` and `--version` exit 0.
pub fn exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}
