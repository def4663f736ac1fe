//! Process lifecycle state and transition listeners.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Starting,
    Started,
    Terminating,
    Terminated,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStatus::Starting => "starting",
            LifecycleStatus::Started => "started",
            LifecycleStatus::Terminating => "terminating",
            LifecycleStatus::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTransition {
    pub current: LifecycleStatus,
    pub next: LifecycleStatus,
}

type Listener = Arc<dyn Fn(&LifecycleTransition) -> BoxFuture<'static, ()> + Send + Sync>;

/// Owner of the process lifecycle status.
///
/// Passed explicitly to the components that react to it. Listeners run one
/// after another in registration order; [`transition`](Self::transition)
/// completes only once every listener's future has completed, so a listener
/// registered later observes the effects of the ones before it.
pub struct LifecycleManager {
    status: Mutex<LifecycleStatus>,
    listeners: Mutex<Vec<Listener>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(LifecycleStatus::Starting),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn status(&self) -> LifecycleStatus {
        *lock(&self.status)
    }

    /// Register a listener. The returned future is awaited before the next
    /// listener is notified.
    pub fn register_listener<F, Fut>(&self, listener: F)
    where
        F: Fn(&LifecycleTransition) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener: Listener =
            Arc::new(move |transition: &LifecycleTransition| -> BoxFuture<'static, ()> {
                Box::pin(listener(transition))
            });
        lock(&self.listeners).push(listener);
    }

    /// Move to `next` and notify every listener in registration order.
    pub async fn transition(&self, next: LifecycleStatus) {
        let transition = {
            let mut status = lock(&self.status);
            let transition = LifecycleTransition {
                current: *status,
                next,
            };
            *status = next;
            transition
        };

        tracing::info!(from = %transition.current, to = %transition.next, "Lifecycle transition");

        // Snapshot so a listener may register further listeners.
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener(&transition).await;
        }
    }
}

/// Listeners never leave the guarded data half-written, so a poisoned lock
/// is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listeners_see_transitions() {
        let manager = LifecycleManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        manager.register_listener(move |t| {
            sink.lock().unwrap().push(*t);
            async {}
        });

        manager.transition(LifecycleStatus::Started).await;
        manager.transition(LifecycleStatus::Terminating).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].current, LifecycleStatus::Starting);
        assert_eq!(seen[1].next, LifecycleStatus::Terminating);
        assert_eq!(manager.status(), LifecycleStatus::Terminating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_listener_waits_for_earlier_one() {
        let manager = LifecycleManager::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        manager.register_listener(move |_| {
            let first = first.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                first.lock().unwrap().push("slow");
            }
        });
        let second = order.clone();
        manager.register_listener(move |_| {
            second.lock().unwrap().push("fast");
            async {}
        });

        manager.transition(LifecycleStatus::Terminating).await;
        assert_eq!(*order.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let manager = Arc::new(LifecycleManager::new());

        let poisoner = manager.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.status.lock().unwrap();
            panic!("listener bug");
        })
        .join();

        assert!(manager.status.is_poisoned());
        assert_eq!(manager.status(), LifecycleStatus::Starting);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&LifecycleStatus::Started).unwrap();
        assert_eq!(json, "\"started\"");
    }
}
