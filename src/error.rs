//! Error handling for the health-check registry
//!
//! This module defines the error types surfaced by registry operations.

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, HealthError>;

/// Errors returned by the health-check registry
#[derive(Error, Debug)]
pub enum HealthError {
    /// Registration rejected because the check configuration is unusable
    #[error("invalid check configuration: {0}")]
    InvalidConfiguration(String),
}

impl HealthError {
    /// Build an `InvalidConfiguration` error from any displayable reason
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}
