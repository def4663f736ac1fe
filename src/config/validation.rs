//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (parsing handles syntax)
//! - Validate value ranges and mount path shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: &ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener is bound

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("offset path {0:?} must start with '/'")]
    RelativeOffsetPath(String),

    #[error("offset path {0:?} must not contain a query or fragment")]
    OffsetPathHasQuery(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    if !config.offset_path.starts_with('/') {
        errors.push(ValidationError::RelativeOffsetPath(config.offset_path.clone()));
    }

    if config.offset_path.contains(['?', '#']) {
        errors.push(ValidationError::OffsetPathHasQuery(config.offset_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
