mod common;

use common::{blocking, fake_image, image_json};
use imgup::api::{Auth, ImgurClient};
use imgup::error::ApiError;
use imgup::validate::{ImageFile, ImageKind, ImageMeta, NewAlbum, Privacy};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn anonymous() -> Auth {
    Auth::Anonymous {
        client_id: "cid".into(),
    }
}

fn image_file(dir: &TempDir, name: &str) -> ImageFile {
    let path = fake_image(dir.path(), name);
    let size = std::fs::metadata(&path).unwrap().len();
    ImageFile {
        path,
        kind: ImageKind::Png,
        size,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn anonymous_upload_sends_client_id_and_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/3/image"))
        .and(header("Authorization", "Client-ID cid"))
        .and(body_string_contains("filename=\"cat.png\""))
        .and(body_string_contains("fake image data for cat.png"))
        .and(body_string_contains("name=\"type\"\r\n\r\nfile\r\n"))
        .and(body_string_contains("name=\"name\"\r\n\r\ncat.png\r\n"))
        .and(body_string_contains("name=\"title\"\r\n\r\nMy cat\r\n"))
        .and(body_string_contains("name=\"description\"\r\n\r\nSleeping\r\n"))
        .and(body_string_contains("name=\"album\"\r\n\r\nalbumhash\r\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_json("abc123")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = image_file(&dir, "cat.png");
    let uri = server.uri();
    let uploaded = blocking(move || {
        let client = ImgurClient::new(&uri, anonymous()).unwrap();
        let meta = ImageMeta {
            title: Some("My cat".into()),
            description: Some("Sleeping".into()),
        };
        client.upload_image(&image, Some("albumhash"), &meta)
    })
    .await
    .unwrap();

    assert_eq!(uploaded.id, "abc123");
    assert_eq!(uploaded.link, "https://i.imgur.com/abc123.png");
    assert_eq!(uploaded.deletehash.as_deref(), Some("del-abc123"));
    assert_eq!(uploaded.mime.as_deref(), Some("image/png"));
}

#[tokio::test(flavor = "multi_thread")]
async fn account_upload_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/3/image"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_json("x1")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = image_file(&dir, "a.png");
    let uri = server.uri();
    let uploaded = blocking(move || {
        let client = ImgurClient::new(
            &uri,
            Auth::Bearer {
                access_token: "tok".into(),
            },
        )
        .unwrap();
        client.upload_image(&image, None, &ImageMeta::default())
    })
    .await
    .unwrap();
    assert_eq!(uploaded.id, "x1");
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_carries_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/3/image"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": {
                "error": {"code": 1003, "message": "File type invalid (1)", "type": "ImgurException"},
                "request": "/3/image",
                "method": "POST"
            },
            "success": false,
            "status": 400
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = image_file(&dir, "a.png");
    let uri = server.uri();
    let err = blocking(move || {
        ImgurClient::new(&uri, anonymous())
            .unwrap()
            .upload_image(&image, None, &ImageMeta::default())
    })
    .await
    .unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "File type invalid (1)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unsuccessful_envelope_is_an_error_even_with_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/3/album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"error": "Too many albums"},
            "success": false,
            "status": 429
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        ImgurClient::new(&uri, anonymous())
            .unwrap()
            .create_album(&NewAlbum::default())
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Status { status: 429, ref message } if message == "Too many albums"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_album_posts_form_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/3/album"))
        .and(header("Authorization", "Client-ID cid"))
        .and(body_string_contains("title=Summer+trip"))
        .and(body_string_contains("privacy=hidden"))
        .and(body_string_contains("description=On+the+coast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "alb1", "deletehash": "albdel"},
            "success": true,
            "status": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let created = blocking(move || {
        ImgurClient::new(&uri, anonymous()).unwrap().create_album(&NewAlbum {
            title: Some("Summer trip".into()),
            description: Some("On the coast".into()),
            privacy: Some(Privacy::Hidden),
        })
    })
    .await
    .unwrap();

    assert_eq!(created.id, "alb1");
    assert_eq!(created.deletehash.as_deref(), Some("albdel"));
}

#[tokio::test(flavor = "multi_thread")]
async fn pin_exchange_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=pin"))
        .and(body_string_contains("pin=123456"))
        .and(body_string_contains("client_secret=shh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc",
            "refresh_token": "ref",
            "expires_in": 315360000,
            "token_type": "bearer",
            "account_username": "alice",
            "account_id": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let token = blocking(move || {
        ImgurClient::new(&uri, anonymous())
            .unwrap()
            .exchange_pin("cid", "shh", "123456")
    })
    .await
    .unwrap();

    assert_eq!(token.access_token, "acc");
    assert_eq!(token.account_username.as_deref(), Some("alice"));
    assert_eq!(token.account_id, Some(42));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_token_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": {"error": "Invalid refresh token", "request": "/oauth2/token", "method": "POST"},
            "success": false,
            "status": 400
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        ImgurClient::new(&uri, anonymous())
            .unwrap()
            .refresh_token("cid", "shh", "stale")
    })
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "request failed with status 400: Invalid refresh token"
    );
}
