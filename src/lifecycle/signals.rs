//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and SIGTERM become a `Terminating` lifecycle transition;
//! everything after that is up to the lifecycle listeners.

use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;

use crate::lifecycle::manager::{LifecycleManager, LifecycleStatus};

/// Wait for Ctrl+C or SIGTERM.
pub async fn termination_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C"),
        _ = terminate => tracing::warn!("Received SIGTERM"),
    }
}

/// Translate the first termination signal into a lifecycle transition.
pub fn spawn_signal_listener(lifecycle: Arc<LifecycleManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        termination_signal().await;
        lifecycle.transition(LifecycleStatus::Terminating).await;
    })
}
