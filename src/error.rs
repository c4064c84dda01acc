// Error types shared by the library modules. The binary wraps these in
// `anyhow::Error` and adds context; the library keeps them typed so the
// tests (and callers) can match on what went wrong.

use crate::api::UploadedImage;
use std::path::PathBuf;

/// Errors produced while talking to the image host.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("credential cannot be sent as a header: {0}")]
    InvalidCredential(#[from] reqwest::header::InvalidHeaderValue),

    #[error("could not read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that end an upload run. Images uploaded before the failure are
/// kept so the caller can still report them.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not create album")]
    CreateAlbum(#[source] ApiError),

    #[error(
        "upload of {} failed after {} of {} image(s) were uploaded",
        .path.display(),
        .uploaded.len(),
        .total
    )]
    Image {
        path: PathBuf,
        uploaded: Vec<UploadedImage>,
        total: usize,
        #[source]
        source: ApiError,
    },
}

/// Why a single file was rejected before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileProblem {
    Missing,
    NotAFile,
    Empty,
    TooLarge(u64),
    UnsupportedType,
    Unreadable(String),
}

impl std::fmt::Display for FileProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileProblem::Missing => write!(f, "no such file"),
            FileProblem::NotAFile => write!(f, "not a regular file"),
            FileProblem::Empty => write!(f, "file is empty"),
            FileProblem::TooLarge(size) => write!(
                f,
                "file is {} bytes, the limit is {} bytes",
                size,
                crate::validate::MAX_IMAGE_BYTES
            ),
            FileProblem::UnsupportedType => write!(f, "not a supported image type"),
            FileProblem::Unreadable(reason) => write!(f, "cannot read metadata: {reason}"),
        }
    }
}

/// Errors found while checking command-line arguments.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no files to upload")]
    NoFiles,

    #[error("{}", describe_bad_files(.0))]
    BadFiles(Vec<(PathBuf, FileProblem)>),

    #[error("album id must not be empty")]
    EmptyAlbumId,

    #[error("album id '{0}' contains characters other than letters and digits")]
    InvalidAlbumId(String),

    #[error("--album and --create-album cannot be used together")]
    AlbumConflict,
}

fn describe_bad_files(files: &[(PathBuf, FileProblem)]) -> String {
    let mut out = format!("{} file(s) cannot be uploaded:", files.len());
    for (path, problem) in files {
        out.push_str(&format!("\n  {}: {}", path.display(), problem));
    }
    out
}

/// Errors reading or writing the stored account credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("could not access credentials file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials file {} is corrupt: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors resolving runtime settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no client id: pass --client-id or set IMGUR_CLIENT_ID")]
    MissingClientId,

    #[error("no client secret: pass --client-secret or set IMGUR_CLIENT_SECRET")]
    MissingClientSecret,

    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}
