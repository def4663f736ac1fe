//! API dispatcher: the embedding application's resources plus the built-in
//! operational routes, presented to the chain as one handler.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;

use crate::http::handler::{HandlerFuture, RequestHandler};
use crate::http::operational::operational_routes;
use crate::lifecycle::LifecycleManager;

#[derive(Debug, Clone)]
pub struct ApiDispatcher {
    router: Router,
}

impl ApiDispatcher {
    /// Merge `resources` with `/metrics` and `/health/*`.
    ///
    /// # Panics
    /// If `resources` already defines one of the operational routes.
    pub fn new(resources: Router, lifecycle: Arc<LifecycleManager>) -> Self {
        Self {
            router: resources.merge(operational_routes(lifecycle)),
        }
    }
}

impl RequestHandler for ApiDispatcher {
    fn handle(&self, request: Request<Body>) -> HandlerFuture {
        self.router.handle(request)
    }
}
