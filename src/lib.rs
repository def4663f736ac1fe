//! Embedded HTTP front door for a service process.
//!
//! ```text
//!     Client ──▶ net::Listener ──▶ http::server ──▶ routing::HandlerChain
//!                                                     │  first match wins
//!                          ┌──────────────────────────┼──────────────────┐
//!                          ▼                          ▼                  ▼
//!                   assets (index)        api: resources +        assets (catch-all)
//!                                         /metrics, /health/*
//!
//!     LifecycleManager ──(Terminating)──▶ ShutdownCoordinator ──▶ drain ≤ grace period
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use error::HostError;
pub use http::{RunningHost, WebHost};
pub use lifecycle::{LifecycleManager, LifecycleStatus, ShutdownState};
