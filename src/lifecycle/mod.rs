//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → LifecycleManager::transition(Terminating)
//!
//! Manager (manager.rs):
//!     transition → listeners in registration order, each awaited in turn
//!
//! Shutdown (shutdown.rs):
//!     Terminating observed → stop accepting → drain connections → close
//!     (the Terminating transition completes only after the drain does)
//! ```
//!
//! # Design Decisions
//! - The lifecycle manager is injected, never a process global
//! - Shutdown has a deadline: remaining connections are dropped after it

pub mod manager;
pub mod shutdown;
pub mod signals;

pub use manager::{LifecycleManager, LifecycleStatus, LifecycleTransition};
pub use shutdown::{ShutdownCoordinator, ShutdownState};
