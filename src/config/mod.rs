//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment
//!     → loader.rs (flatten into dotted-key Properties)
//!     → schema.rs (resolve ServerConfig over defaults)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (immutable once the listener starts)
//! ```
//!
//! # Design Decisions
//! - Config is resolved once; there is no reload
//! - All fields have defaults to allow an empty config
//! - Validation separates parsing from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, Properties};
pub use schema::ServerConfig;
pub use validation::{validate_config, ValidationError};
