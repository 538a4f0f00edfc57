//! Shared test utilities: on-disk cores and a local HTTP target.

use std::time::Duration;

use axum::http::{header, HeaderMap, Method};
use axum::routing::{any, get};
use axum::{Json, Router};
use posto::{Config, Database, PostoCore};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Bytes served by `/image`; not a full PNG, only the signature and a tail.
pub const IMAGE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xDE, 0xAD];

/// A core backed by a database file inside a temporary directory.
pub fn create_test_core() -> (PostoCore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("posto.db")).expect("Failed to open database");
    let core = PostoCore::new(Config::default(), db).expect("Failed to build core");
    (core, dir)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "content_type": header("content-type"),
        "authorization": header("authorization"),
        "body": body,
    }))
}

/// Serve `/echo`, `/image` and `/slow` on an ephemeral port; returns the base URL.
pub async fn spawn_target() -> String {
    let app = Router::new()
        .route("/echo", any(echo))
        .route(
            "/image",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], IMAGE_BYTES.to_vec()) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test target");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test target crashed");
    });
    format!("http://{}", addr)
}
