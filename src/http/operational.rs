//! Always-on operational resources: metrics scrape and health probes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::lifecycle::{LifecycleManager, LifecycleStatus};
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub lifecycle: LifecycleStatus,
}

pub fn operational_routes(lifecycle: Arc<LifecycleManager>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health/liveness", get(get_liveness))
        .route("/health/readiness", get(get_readiness))
        .with_state(lifecycle)
}

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render().unwrap_or_default(),
    )
}

async fn get_liveness(State(lifecycle): State<Arc<LifecycleManager>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        lifecycle: lifecycle.status(),
    })
}

async fn get_readiness(State(lifecycle): State<Arc<LifecycleManager>>) -> impl IntoResponse {
    let lifecycle = lifecycle.status();
    if lifecycle == LifecycleStatus::Started {
        (StatusCode::OK, Json(HealthStatus { status: "ready", lifecycle }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable",
                lifecycle,
            }),
        )
    }
}
