// API client module: a small blocking HTTP client for the Imgur v3 REST
// API. Uploads are strictly sequential so there is nothing to gain from an
// async runtime here.

use crate::error::ApiError;
use crate::validate::{ImageFile, ImageMeta, NewAlbum};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.imgur.com";

/// Public address of an album, given its id.
pub fn album_link(id: &str) -> String {
    format!("https://imgur.com/a/{id}")
}

/// How requests identify themselves to the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// Uploads are not tied to any account.
    Anonymous { client_id: String },
    /// Uploads land in the account that owns the token.
    Bearer { access_token: String },
}

impl Auth {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Auth::Anonymous { .. })
    }
}

/// Blocking client holding the base URL and the credentials to send.
#[derive(Clone)]
pub struct ImgurClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

/// Every `/3/` endpoint wraps its payload in this envelope.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Debug)]
struct ErrorData {
    error: Option<ErrorDetail>,
}

/// The API reports errors either as a plain string or as an object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Object { message: String },
}

/// An image as returned by the upload endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub id: String,
    pub link: String,
    #[serde(default)]
    pub deletehash: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub mime: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Response of the album creation endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedAlbum {
    pub id: String,
    #[serde(default)]
    pub deletehash: Option<String>,
}

/// OAuth2 token response. Unlike the `/3/` endpoints it is not wrapped.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub account_username: Option<String>,
    #[serde(default)]
    pub account_id: Option<u64>,
}

impl ImgurClient {
    pub fn new(base_url: &str, auth: Auth) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("imgup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ImgurClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let value = match &self.auth {
            Auth::Anonymous { client_id } => format!("Client-ID {client_id}"),
            Auth::Bearer { access_token } => format!("Bearer {access_token}"),
        };
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value)?);
        Ok(headers)
    }

    /// Upload one image, optionally into an album. `album` is the album id
    /// for account uploads and the album deletehash for anonymous ones.
    pub fn upload_image(
        &self,
        image: &ImageFile,
        album: Option<&str>,
        meta: &ImageMeta,
    ) -> Result<UploadedImage, ApiError> {
        let file = File::open(&image.path).map_err(|source| ApiError::File {
            path: image.path.clone(),
            source,
        })?;
        let name = image.file_name();
        let part = multipart::Part::reader_with_length(file, image.size)
            .file_name(name.clone())
            .mime_str(image.kind.mime())?;

        let mut form = multipart::Form::new()
            .part("image", part)
            .text("type", "file")
            .text("name", name);
        if let Some(title) = &meta.title {
            form = form.text("title", title.clone());
        }
        if let Some(description) = &meta.description {
            form = form.text("description", description.clone());
        }
        if let Some(album) = album {
            form = form.text("album", album.to_string());
        }

        info!(path = %image.path.display(), size = image.size, "uploading image");
        let res = self
            .client
            .post(self.url("/3/image"))
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()?;
        let uploaded: UploadedImage = read_data(res)?;
        debug!(id = %uploaded.id, link = %uploaded.link, "image uploaded");
        Ok(uploaded)
    }

    /// Create an empty album.
    pub fn create_album(&self, album: &NewAlbum) -> Result<CreatedAlbum, ApiError> {
        let mut fields: Vec<(&str, &str)> = Vec::new();
        if let Some(title) = &album.title {
            fields.push(("title", title.as_str()));
        }
        if let Some(description) = &album.description {
            fields.push(("description", description.as_str()));
        }
        if let Some(privacy) = album.privacy {
            fields.push(("privacy", privacy.as_str()));
        }

        info!(title = ?album.title, "creating album");
        let res = self
            .client
            .post(self.url("/3/album"))
            .headers(self.auth_headers()?)
            .form(&fields)
            .send()?;
        let created: CreatedAlbum = read_data(res)?;
        debug!(id = %created.id, "album created");
        Ok(created)
    }

    /// Address the user opens in a browser to obtain a PIN.
    pub fn authorize_url(&self, client_id: &str) -> Result<String, ApiError> {
        let req = self
            .client
            .get(self.url("/oauth2/authorize"))
            .query(&[("client_id", client_id), ("response_type", "pin")])
            .build()?;
        Ok(req.url().to_string())
    }

    /// Exchange the PIN shown after authorization for tokens.
    pub fn exchange_pin(
        &self,
        client_id: &str,
        client_secret: &str,
        pin: &str,
    ) -> Result<Token, ApiError> {
        self.request_token(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "pin"),
            ("pin", pin),
        ])
    }

    /// Obtain a new access token from a refresh token.
    pub fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<Token, ApiError> {
        self.request_token(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
    }

    fn request_token(&self, fields: &[(&str, &str)]) -> Result<Token, ApiError> {
        let res = self
            .client
            .post(self.url("/oauth2/token"))
            .form(fields)
            .send()?;
        let body = check_status(res)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Return the body of a successful response, or turn a failed one into
/// `ApiError::Status`.
fn check_status(res: Response) -> Result<String, ApiError> {
    let status = res.status();
    if let Some(remaining) = res.headers().get("X-RateLimit-ClientRemaining") {
        debug!(remaining = ?remaining, "client rate limit");
    }
    let body = res.text()?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(body)
}

/// Unwrap the `data` member of a `/3/` response. A 200 with
/// `"success": false` is still an error.
fn read_data<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let status = res.status().as_u16();
    let body = check_status(res)?;
    let value: serde_json::Value = serde_json::from_str(&body)?;
    if value.get("success") == Some(&serde_json::Value::Bool(false)) {
        let status = value
            .get("status")
            .and_then(|s| s.as_u64())
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(status);
        return Err(ApiError::Status {
            status,
            message: error_message(&body),
        });
    }
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    Ok(envelope.data)
}

/// Best-effort extraction of a human readable message from an error body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope<ErrorData>>(body) {
        match envelope.data.error {
            Some(ErrorDetail::Text(text)) => return text,
            Some(ErrorDetail::Object { message }) => return message,
            None => {}
        }
    }
    if let Ok(data) = serde_json::from_str::<ErrorData>(body) {
        match data.error {
            Some(ErrorDetail::Text(text)) => return text,
            Some(ErrorDetail::Object { message }) => return message,
            None => {}
        }
    }
    let body = body.trim();
    if body.is_empty() {
        "empty response".into()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_from_string_error() {
        let body = r#"{"data":{"error":"Invalid client_id","request":"/3/image","method":"POST"},"success":false,"status":403}"#;
        assert_eq!(error_message(body), "Invalid client_id");
    }

    #[test]
    fn message_from_object_error() {
        let body = r#"{"data":{"error":{"code":1003,"message":"File type invalid (1)","type":"ImgurException"},"request":"/3/image"},"success":false,"status":400}"#;
        assert_eq!(error_message(body), "File type invalid (1)");
    }

    #[test]
    fn message_from_unwrapped_error() {
        assert_eq!(error_message(r#"{"error":"invalid_grant"}"#), "invalid_grant");
    }

    #[test]
    fn message_falls_back_to_body() {
        assert_eq!(error_message("  Over capacity \n"), "Over capacity");
        assert_eq!(error_message(""), "empty response");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ImgurClient::new(
            "http://localhost:9/",
            Auth::Anonymous {
                client_id: "abc".into(),
            },
        )
        .unwrap();
        assert_eq!(client.url("/3/image"), "http://localhost:9/3/image");
    }

    #[test]
    fn authorize_url_carries_client_id() {
        let client = ImgurClient::new(DEFAULT_API_URL, Auth::Anonymous { client_id: "x".into() }).unwrap();
        assert_eq!(
            client.authorize_url("my id").unwrap(),
            "https://api.imgur.com/oauth2/authorize?client_id=my+id&response_type=pin"
        );
    }

    #[test]
    fn header_reflects_auth_mode() {
        let anon = ImgurClient::new(DEFAULT_API_URL, Auth::Anonymous { client_id: "cid".into() }).unwrap();
        assert_eq!(anon.auth_headers().unwrap()[AUTHORIZATION], "Client-ID cid");

        let bearer = ImgurClient::new(DEFAULT_API_URL, Auth::Bearer { access_token: "tok".into() }).unwrap();
        assert_eq!(bearer.auth_headers().unwrap()[AUTHORIZATION], "Bearer tok");
    }
}
