//! Cloud resource graph error types

use thiserror::Error;

/// Resource graph and deployment errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid resource {resource}: {message}")]
    InvalidResource { resource: String, message: String },

    #[error("Resource already registered: {0}")]
    DuplicateResource(String),

    #[error("Resource {resource} depends on unregistered resource {dependency}")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Output not resolved yet: {0}")]
    UnresolvedOutput(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub(crate) fn invalid(resource: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::InvalidResource {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
