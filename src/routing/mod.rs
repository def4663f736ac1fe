//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → chain.rs (scan entries in registration order)
//!     → matcher.rs (context path + URL pattern per rule)
//!     → Return: first matching handler, or 404
//!
//! Chain construction (at startup):
//!     registry.rs (API patterns: defaults or override)
//!     → layout.rs (assets / operational / API / catch-all ordering)
//!     → Freeze as immutable HandlerChain
//! ```
//!
//! # Design Decisions
//! - Chain built once at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same handler
//! - First match wins (ordered by registration)

pub mod chain;
pub mod layout;
pub mod matcher;
pub mod registry;

pub use chain::{HandlerChain, HandlerChainBuilder, HandlerEntry};
pub use layout::build_handler_chain;
pub use matcher::{MountRule, UrlPattern};
