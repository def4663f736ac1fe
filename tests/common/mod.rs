//! Shared utilities for integration tests.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use web_host::{LifecycleManager, RunningHost, ServerConfig, WebHost};

/// Application resources: echo the path the resource framework sees.
pub fn echo_resources() -> Router {
    Router::new()
        .route("/mr-api/{*rest}", get(echo_path))
        .route("/dacha2/{*rest}", get(echo_path))
        .route("/a/{*rest}", get(echo_path))
        .route("/features", get(echo_path))
}

/// A resource at `/mr-api/slow` that signals `entered` and then sleeps, and
/// one at `/mr-api/boom` that signals `entered` and panics 300ms later.
#[allow(dead_code)]
pub fn slow_resources(entered: Arc<Notify>, delay: Duration) -> Router {
    let boom_entered = entered.clone();
    echo_resources()
        .route(
            "/mr-api/slow",
            get(move || {
                let entered = entered.clone();
                async move {
                    entered.notify_one();
                    tokio::time::sleep(delay).await;
                    "done"
                }
            }),
        )
        .route(
            "/mr-api/boom",
            get(move || fail_after_entering(boom_entered.clone())),
        )
}

async fn fail_after_entering(entered: Arc<Notify>) -> &'static str {
    entered.notify_one();
    tokio::time::sleep(Duration::from_millis(300)).await;
    panic!("resource failure");
}

async fn echo_path(uri: Uri) -> String {
    format!("api:{}", uri.path())
}

/// Single-page app fixture.
#[allow(dead_code)]
pub fn web_assets() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("index.html"),
        "<html><head><base href=\"/\"></head><body>spa</body></html>",
    )
    .unwrap();
    fs::write(dir.path().join("main.js"), "boot();").unwrap();
    dir
}

/// Start a host on an ephemeral local port.
pub async fn start_host(host: WebHost) -> RunningHost {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    host.start_with_listener(listener).await.unwrap()
}

pub fn host(config: ServerConfig, resources: Router) -> (WebHost, Arc<LifecycleManager>) {
    let lifecycle = Arc::new(LifecycleManager::new());
    (WebHost::new(config, resources, lifecycle.clone()), lifecycle)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// GET `path`, returning the status and body text.
pub async fn get_text(running: &RunningHost, path: &str) -> (u16, String) {
    let res = client()
        .get(format!("http://{}{}", running.local_addr(), path))
        .send()
        .await
        .expect("host unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}
