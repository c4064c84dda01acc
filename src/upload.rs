// Sequential upload orchestration: create the album if asked to, then send
// every file in plan order. The first failure ends the run.

use crate::api::{album_link, CreatedAlbum, ImgurClient, UploadedImage};
use crate::error::{ApiError, UploadError};
use crate::validate::{AlbumTarget, ImageFile, ImageMeta, NewAlbum, UploadPlan};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{info, warn};

/// The operations an upload run needs from the host.
pub trait ImageHost {
    /// Anonymous uploads address albums by deletehash, account uploads by id.
    fn is_anonymous(&self) -> bool;

    fn create_album(&self, album: &NewAlbum) -> Result<CreatedAlbum, ApiError>;

    fn upload_image(
        &self,
        image: &ImageFile,
        album: Option<&str>,
        meta: &ImageMeta,
    ) -> Result<UploadedImage, ApiError>;
}

impl ImageHost for ImgurClient {
    fn is_anonymous(&self) -> bool {
        self.auth().is_anonymous()
    }

    fn create_album(&self, album: &NewAlbum) -> Result<CreatedAlbum, ApiError> {
        ImgurClient::create_album(self, album)
    }

    fn upload_image(
        &self,
        image: &ImageFile,
        album: Option<&str>,
        meta: &ImageMeta,
    ) -> Result<UploadedImage, ApiError> {
        ImgurClient::upload_image(self, image, album, meta)
    }
}

/// The album the images went into. For an existing anonymous album only
/// the deletehash is known.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    pub id: Option<String>,
    pub link: Option<String>,
    pub deletehash: Option<String>,
    pub created: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub album: Option<AlbumInfo>,
    pub images: Vec<UploadedImage>,
}

/// Run the plan against `host`, advancing `progress` once per file.
pub fn run<H: ImageHost>(
    host: &H,
    plan: &UploadPlan,
    progress: &ProgressBar,
) -> Result<UploadSummary, UploadError> {
    let anonymous = host.is_anonymous();

    let album = match &plan.album {
        AlbumTarget::None => None,
        AlbumTarget::Existing(handle) => Some(if anonymous {
            AlbumInfo {
                id: None,
                link: None,
                deletehash: Some(handle.clone()),
                created: false,
            }
        } else {
            AlbumInfo {
                id: Some(handle.clone()),
                link: Some(album_link(handle)),
                deletehash: None,
                created: false,
            }
        }),
        AlbumTarget::New(new_album) => {
            progress.set_message("creating album");
            let created = host
                .create_album(new_album)
                .map_err(UploadError::CreateAlbum)?;
            info!(id = %created.id, "created album");
            Some(AlbumInfo {
                link: Some(album_link(&created.id)),
                id: Some(created.id),
                deletehash: created.deletehash,
                created: true,
            })
        }
    };

    let handle = album.as_ref().and_then(|a| album_handle(a, anonymous));

    let total = plan.files.len();
    let mut images = Vec::with_capacity(total);
    for image in &plan.files {
        progress.set_message(image.file_name());
        match host.upload_image(image, handle.as_deref(), &plan.meta) {
            Ok(uploaded) => {
                info!(path = %image.path.display(), link = %uploaded.link, "uploaded");
                images.push(uploaded);
                progress.inc(1);
            }
            Err(source) => {
                for done in &images {
                    warn!(link = %done.link, "uploaded before the failure");
                }
                return Err(UploadError::Image {
                    path: image.path.clone(),
                    uploaded: images,
                    total,
                    source,
                });
            }
        }
    }
    progress.finish_and_clear();

    Ok(UploadSummary { album, images })
}

/// Value to send in the `album` field of each upload.
fn album_handle(album: &AlbumInfo, anonymous: bool) -> Option<String> {
    if anonymous {
        if album.deletehash.is_none() {
            warn!("album has no deletehash, anonymous uploads will not be added to it");
        }
        album.deletehash.clone()
    } else {
        album.id.clone()
    }
}
