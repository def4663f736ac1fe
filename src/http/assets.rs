//! Single-page web app assets.
//!
//! Index requests get `index.html` with its `<base href="/">` pointed at the
//! mount path. Anything else is a file under the asset directory; a GET or
//! HEAD for a missing file falls back to the index so client-side routes
//! survive a reload.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::handler::{HandlerFuture, RequestHandler};

const INDEX_FILE: &str = "index.html";
const DEFAULT_BASE: &str = "<base href=\"/\">";

#[derive(Debug, Clone)]
pub struct StaticAssetHandler {
    root: PathBuf,
    offset_path: String,
    files: ServeDir,
}

impl StaticAssetHandler {
    pub fn new(root: impl AsRef<Path>, offset_path: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        let mut offset_path = offset_path.to_string();
        if !offset_path.ends_with('/') {
            offset_path.push('/');
        }

        Self {
            files: ServeDir::new(&root),
            root,
            offset_path,
        }
    }

    async fn serve_index(root: PathBuf, offset_path: String) -> Response {
        let path = root.join(INDEX_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => {
                let html = html.replace(DEFAULT_BASE, &format!("<base href=\"{}\">", offset_path));
                let mut response = Html(html).into_response();
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
                response
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Index document unavailable");
                StatusCode::NOT_FOUND.into_response()
            }
        }
    }
}

fn is_index(path: &str) -> bool {
    path.is_empty() || path == "/" || path == "/index.html"
}

impl RequestHandler for StaticAssetHandler {
    fn handle(&self, request: Request<Body>) -> HandlerFuture {
        let root = self.root.clone();
        let offset_path = self.offset_path.clone();
        let files = self.files.clone();

        Box::pin(async move {
            if is_index(request.uri().path()) {
                return Self::serve_index(root, offset_path).await;
            }

            let spa_fallback = matches!(*request.method(), Method::GET | Method::HEAD);
            let response = match files.oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            };

            if response.status() == StatusCode::NOT_FOUND && spa_fallback {
                return Self::serve_index(root, offset_path).await;
            }
            response
        })
    }
}
