//! Top-level error for starting the host.

use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::net::ListenerError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<Vec<ValidationError>> for HostError {
    fn from(errors: Vec<ValidationError>) -> Self {
        HostError::Validation(errors)
    }
}
