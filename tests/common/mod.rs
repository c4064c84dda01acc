// Helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// The blocking client must not run on an async worker thread.
pub async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

/// Write a small stand-in image. The content is ASCII so request bodies can
/// be matched as strings.
pub fn fake_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("fake image data for {name}")).unwrap();
    path
}

pub fn image_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": id,
            "deletehash": format!("del-{id}"),
            "link": format!("https://i.imgur.com/{id}.png"),
            "type": "image/png",
            "width": 1,
            "height": 1,
            "size": 20
        },
        "success": true,
        "status": 200
    })
}
