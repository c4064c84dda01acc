// Argument validation: turns the raw command-line inputs into an
// `UploadPlan`. Everything that can be checked locally is checked here,
// before the first request goes out, so a typo in the tenth path does not
// leave nine orphaned images behind.

use crate::error::{FileProblem, ValidationError};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Largest still image the host accepts.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Image formats the host accepts, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Apng,
    Tiff,
    Bmp,
    Webp,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let kind = match ext.as_str() {
            "jpg" | "jpeg" => ImageKind::Jpeg,
            "png" => ImageKind::Png,
            "gif" => ImageKind::Gif,
            "apng" => ImageKind::Apng,
            "tif" | "tiff" => ImageKind::Tiff,
            "bmp" => ImageKind::Bmp,
            "webp" => ImageKind::Webp,
            _ => return None,
        };
        Some(kind)
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Apng => "image/apng",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Webp => "image/webp",
        }
    }
}

/// A local file that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub size: u64,
}

impl ImageFile {
    /// File name sent along with the upload.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into())
    }
}

/// Album visibility, using the values the API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Privacy {
    Public,
    Hidden,
    Secret,
}

impl Privacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Hidden => "hidden",
            Privacy::Secret => "secret",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAlbum {
    pub title: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<Privacy>,
}

/// Where the uploaded images should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumTarget {
    None,
    /// Album id for account uploads, deletehash for anonymous ones.
    Existing(String),
    New(NewAlbum),
}

/// Metadata applied to every image in the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub files: Vec<ImageFile>,
    pub album: AlbumTarget,
    pub meta: ImageMeta,
}

/// Check the inputs of an `upload` run and build the plan.
///
/// File problems are collected for every path and reported together.
/// Paths that appear more than once are uploaded once, at the position of
/// their first occurrence.
pub fn build_plan(
    files: &[PathBuf],
    existing_album: Option<&str>,
    new_album: Option<NewAlbum>,
    meta: ImageMeta,
) -> Result<UploadPlan, ValidationError> {
    if files.is_empty() {
        return Err(ValidationError::NoFiles);
    }

    let album = match (existing_album, new_album) {
        (Some(_), Some(_)) => return Err(ValidationError::AlbumConflict),
        (Some(id), None) => AlbumTarget::Existing(check_album_id(id)?),
        (None, Some(album)) => AlbumTarget::New(album),
        (None, None) => AlbumTarget::None,
    };

    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for path in files {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.clone());
        if !seen.insert(key) {
            warn!(path = %path.display(), "file given more than once, uploading it once");
            continue;
        }
        match check_file(path) {
            Ok(image) => {
                debug!(path = %path.display(), size = image.size, mime = image.kind.mime(), "accepted");
                accepted.push(image);
            }
            Err(problem) => rejected.push((path.clone(), problem)),
        }
    }

    if !rejected.is_empty() {
        return Err(ValidationError::BadFiles(rejected));
    }

    Ok(UploadPlan {
        files: accepted,
        album,
        meta,
    })
}

fn check_album_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::EmptyAlbumId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidAlbumId(id.to_string()));
    }
    Ok(id.to_string())
}

fn check_file(path: &Path) -> Result<ImageFile, FileProblem> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FileProblem::Missing,
        _ => FileProblem::Unreadable(e.to_string()),
    })?;
    if !meta.is_file() {
        return Err(FileProblem::NotAFile);
    }
    let kind = ImageKind::from_path(path).ok_or(FileProblem::UnsupportedType)?;
    let size = meta.len();
    if size == 0 {
        return Err(FileProblem::Empty);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(FileProblem::TooLarge(size));
    }
    Ok(ImageFile {
        path: path.to_path_buf(),
        kind,
        size,
    })
}
