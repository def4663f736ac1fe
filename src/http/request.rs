//! Request-scoped data.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for `x-request-id`
//! - Carry the matched mount into the handler as a request extension
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Handlers see the path relative to the matched context path; the
//!   original URI stays available through [`MountContext`]

use axum::http::{HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Where the request was mounted when the chain dispatched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountContext {
    /// Context path of the matching rule (empty at the root).
    pub context_path: String,
    /// The rule's URL pattern as registered.
    pub url_pattern: String,
    /// URI as received, before the context path was stripped.
    pub original_uri: Uri,
}

/// Replace the request path with `path`, keeping the query string.
pub fn rewrite_path<B>(request: &mut Request<B>, path: &str) {
    let path = if path.is_empty() { "/" } else { path };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    match path_and_query.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => tracing::warn!(path = %path_and_query, error = %e, "Keeping original URI"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_keeps_query() {
        let mut req = Request::builder()
            .uri("http://example.com/app/mr-api/portfolio?x=1")
            .body(())
            .unwrap();
        rewrite_path(&mut req, "/mr-api/portfolio");
        assert_eq!(req.uri().path(), "/mr-api/portfolio");
        assert_eq!(req.uri().query(), Some("x=1"));
    }

    #[test]
    fn test_rewrite_empty_is_root() {
        let mut req = Request::builder().uri("/app").body(()).unwrap();
        rewrite_path(&mut req, "");
        assert_eq!(req.uri().path(), "/");
    }

    #[test]
    fn test_request_ids_unique() {
        let req = Request::builder().body(()).unwrap();
        let mut maker = MakeRequestUuid;
        let a = maker.make_request_id(&req).unwrap();
        let b = maker.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
