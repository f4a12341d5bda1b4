//! What the server writes to its log, checked through a captured fmt subscriber.
//!
//! Run with: cargo test --test logging_tests
mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use common::{CapturedLogs, GIF};
use trackpixel::config::{AppConfig, DEFAULT_PORT};
use trackpixel::http::{bind, serve};
use trackpixel::pixel::PixelSource;
use trackpixel::{create_router, AppState};

/// Production router (tracing recorder) serving from `dir`, with or without the asset.
fn router(dir: &tempfile::TempDir, with_asset: bool) -> Router {
    let path = dir.path().join("transparent.gif");
    if with_asset {
        std::fs::write(&path, GIF).unwrap();
    }
    create_router(AppState::new(PixelSource::Disk(path)))
}

async fn get(app: Router, uri: &str) -> StatusCode {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_open_is_logged_with_email() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let dir = tempfile::tempdir().unwrap();

    let status = get(router(&dir, true), "/track?email=carol@example.com").await;

    assert_eq!(status, StatusCode::OK);
    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "{lines:#?}");
    assert!(lines[0].contains("Email opened by: carol@example.com at "), "{lines:#?}");
    assert!(lines[0].contains("request_id="), "{lines:#?}");
}

#[tokio::test]
async fn test_open_without_email_logs_empty_value() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let dir = tempfile::tempdir().unwrap();

    let status = get(router(&dir, true), "/track").await;

    assert_eq!(status, StatusCode::OK);
    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "{lines:#?}");
    assert!(lines[0].contains("Email opened by:  at "), "{lines:#?}");
}

#[tokio::test]
async fn test_missing_asset_logs_only_the_open() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let dir = tempfile::tempdir().unwrap();

    let status = get(router(&dir, false), "/track?email=bob@example.com").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "{lines:#?}");
    assert!(lines[0].contains("Email opened by: bob@example.com"), "{lines:#?}");
    assert!(!lines[0].contains("ERROR"), "{lines:#?}");
}

#[tokio::test]
async fn test_unknown_path_logs_nothing() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let dir = tempfile::tempdir().unwrap();

    let status = get(router(&dir, true), "/favicon.ico").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(logs.lines().is_empty(), "{:#?}", logs.lines());
}

#[tokio::test]
async fn test_startup_without_port_env_uses_and_logs_default_port() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("trackpixel.toml");
    std::fs::write(&config_path, "").unwrap();

    let config = AppConfig::resolve(Some(&config_path), None, None).unwrap();
    assert_eq!(config.http.port, DEFAULT_PORT);

    let logs = CapturedLogs::default();
    let _guard = logs.install();

    // The default port may be taken on the test host; bind the resolved
    // address, falling back to an ephemeral port to check the log line.
    let mut addr = config.http.socket_addr().unwrap();
    addr.set_ip("127.0.0.1".parse().unwrap());
    let listener = match bind(addr).await {
        Ok(listener) => listener,
        Err(_) => bind("127.0.0.1:0".parse().unwrap()).await.unwrap(),
    };
    let port = listener.local_addr().unwrap().port();

    // serve never returns on its own; the timeout only lets the startup log happen
    let served = tokio::time::timeout(
        Duration::from_millis(100),
        serve(listener, router(&dir, true)),
    )
    .await;
    assert!(served.is_err());

    assert!(
        logs.contains(&format!("Server starting on port {port}")),
        "{:#?}",
        logs.lines()
    );
}
