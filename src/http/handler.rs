//! Handler capability used by the dispatch chain.
//!
//! The chain never sees a concrete framework type; anything that can turn a
//! request into a response is registered through [`RequestHandler`].

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use futures_util::future::BoxFuture;
use tower::ServiceExt;

pub type HandlerFuture = BoxFuture<'static, Response>;

/// Something the chain can dispatch a request to.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Request<Body>) -> HandlerFuture;
}

/// Shared reference to a handler owned outside the chain.
pub type HandlerRef = Arc<dyn RequestHandler>;

impl RequestHandler for Router {
    fn handle(&self, request: Request<Body>) -> HandlerFuture {
        let router = self.clone();
        Box::pin(async move {
            match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        })
    }
}

/// Adapts an async closure into a [`RequestHandler`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnHandler { f }
}

impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, request: Request<Body>) -> HandlerFuture {
        Box::pin((self.f)(request))
    }
}
