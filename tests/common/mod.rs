#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use chart_sniper::backend::HttpBackend;
use chart_sniper::proxy::{self, ProxyState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// What the stub backend received: content type and raw body.
pub type Seen = Arc<Mutex<Vec<(Option<String>, Vec<u8>)>>>;

#[derive(Clone)]
struct StubBackend {
    status: StatusCode,
    body: &'static str,
    seen: Seen,
}

async fn stub_analyze(State(stub): State<StubBackend>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().await.push((content_type, body.to_vec()));
    (stub.status, stub.body).into_response()
}

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Starts a backend whose `/analyze` always answers `status` with `body`.
pub async fn spawn_backend(status: u16, body: &'static str) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let stub = StubBackend {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/analyze", post(stub_analyze))
        .layer(DefaultBodyLimit::disable())
        .with_state(stub);
    let addr = spawn(app).await;
    (format!("http://{addr}"), seen)
}

/// A URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Starts the proxy in front of `backend_url` and returns its base URL.
pub async fn spawn_proxy(backend_url: &str) -> String {
    let backend = HttpBackend::new(backend_url, None).unwrap();
    let app = proxy::router(ProxyState::new(Arc::new(backend)));
    let addr = spawn(app).await;
    format!("http://{addr}")
}

/// Writes `bytes` to `name` inside a fresh temp dir; the dir is removed when the guard drops.
pub fn temp_file(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}
