//! Shutdown coordination for the web host.
//!
//! ```text
//! Waiting ──(next == Terminating)──▶ Draining ──▶ Drained
//!                                        └──────▶ DrainFailed
//! ```
//!
//! The coordinator only reacts to the lifecycle; it never starts a shutdown.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::lifecycle::manager::{LifecycleManager, LifecycleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Waiting,
    Draining,
    Drained,
    DrainFailed,
}

impl ShutdownState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ShutdownState::Drained | ShutdownState::DrainFailed)
    }
}

/// Coordinator for graceful shutdown.
///
/// Publishes its state on a watch channel that the accept loop and every
/// connection task subscribe to.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    grace_period: Duration,
    state: Arc<watch::Sender<ShutdownState>>,
}

impl ShutdownCoordinator {
    /// Create a coordinator and register its single lifecycle listener.
    ///
    /// On `Terminating` the listener starts the drain and holds the
    /// transition until the drain has finished or failed. It keeps only a
    /// weak handle, so a host that is gone never blocks the lifecycle.
    pub fn register(lifecycle: &LifecycleManager, grace_period: Duration) -> Self {
        let (state, _) = watch::channel(ShutdownState::Waiting);
        let state = Arc::new(state);

        let trigger = Arc::downgrade(&state);
        lifecycle.register_listener(move |transition| {
            let outcome = (transition.next == LifecycleStatus::Terminating)
                .then(|| trigger.upgrade())
                .flatten()
                .map(|state| {
                    let started = state.send_if_modified(|state| {
                        if *state == ShutdownState::Waiting {
                            *state = ShutdownState::Draining;
                            true
                        } else {
                            false
                        }
                    });

                    if started {
                        tracing::info!("Terminating, draining server");
                    }
                    state.subscribe()
                });

            async move {
                if let Some(mut rx) = outcome {
                    // Err only when every coordinator handle is gone.
                    let _ = rx.wait_for(|state| state.is_terminal()).await;
                }
            }
        });

        Self {
            grace_period,
            state,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    /// Resolves once draining has been requested.
    pub fn drain_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        drain_signal(self.subscribe())
    }

    /// Run `drain` bounded by the grace period and record the outcome.
    ///
    /// Failures are logged, never returned; the process terminates
    /// regardless.
    pub async fn drain<F, E>(&self, drain: F) -> ShutdownState
    where
        F: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let grace_period_secs = self.grace_period.as_secs();

        let outcome = match tokio::time::timeout(self.grace_period, drain).await {
            Ok(Ok(())) => {
                tracing::info!("Server drained");
                ShutdownState::Drained
            }
            Ok(Err(e)) => {
                tracing::error!(
                    error = %e,
                    "Failed to shutdown server in {} seconds",
                    grace_period_secs
                );
                ShutdownState::DrainFailed
            }
            Err(_) => {
                tracing::error!("Failed to shutdown server in {} seconds", grace_period_secs);
                ShutdownState::DrainFailed
            }
        };

        self.state.send_replace(outcome);
        outcome
    }
}

/// Completes when `rx` leaves `Waiting`, or when the coordinator is gone.
pub async fn drain_signal(mut rx: watch::Receiver<ShutdownState>) {
    let _ = rx.wait_for(|state| *state != ShutdownState::Waiting).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(grace_secs: u64) -> (Arc<LifecycleManager>, ShutdownCoordinator) {
        let lifecycle = Arc::new(LifecycleManager::new());
        let coordinator = ShutdownCoordinator::register(&lifecycle, Duration::from_secs(grace_secs));
        (lifecycle, coordinator)
    }

    fn terminate(lifecycle: &Arc<LifecycleManager>) -> tokio::task::JoinHandle<()> {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move { lifecycle.transition(LifecycleStatus::Terminating).await })
    }

    #[tokio::test]
    async fn test_only_terminating_starts_drain() {
        let (lifecycle, coordinator) = coordinator(10);
        assert_eq!(coordinator.state(), ShutdownState::Waiting);

        lifecycle.transition(LifecycleStatus::Started).await;
        assert_eq!(coordinator.state(), ShutdownState::Waiting);

        let terminating = terminate(&lifecycle);
        coordinator.drain_requested().await;
        assert_eq!(coordinator.state(), ShutdownState::Draining);
        assert!(!terminating.is_finished());

        let outcome = coordinator.drain(async { Ok::<_, std::io::Error>(()) }).await;
        assert_eq!(outcome, ShutdownState::Drained);
        terminating.await.unwrap();
        assert_eq!(coordinator.state(), ShutdownState::Drained);
    }

    #[tokio::test]
    async fn test_drain_error_is_failure() {
        let (_lifecycle, coordinator) = coordinator(10);
        let outcome = coordinator
            .drain(async { Err::<(), _>("connection task panicked") })
            .await;
        assert_eq!(outcome, ShutdownState::DrainFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_bounded_by_grace_period() {
        let (_lifecycle, coordinator) = coordinator(2);

        let started = tokio::time::Instant::now();
        let outcome = coordinator
            .drain(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, std::io::Error>(())
            })
            .await;

        assert_eq!(outcome, ShutdownState::DrainFailed);
        assert!(started.elapsed() <= Duration::from_secs(2) + Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_repeated_terminating_is_ignored() {
        let (lifecycle, coordinator) = coordinator(10);
        let terminating = terminate(&lifecycle);
        coordinator.drain_requested().await;
        coordinator.drain(async { Ok::<_, std::io::Error>(()) }).await;
        terminating.await.unwrap();

        lifecycle.transition(LifecycleStatus::Terminating).await;
        assert_eq!(coordinator.state(), ShutdownState::Drained);
    }

    #[tokio::test]
    async fn test_dropped_host_releases_lifecycle() {
        let (lifecycle, coordinator) = coordinator(10);
        let terminating = terminate(&lifecycle);
        coordinator.drain_requested().await;

        drop(coordinator);
        terminating.await.unwrap();
        lifecycle.transition(LifecycleStatus::Terminated).await;
    }
}
