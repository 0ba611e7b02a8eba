use shared_types::VariableId;
use thiserror::Error;

/// Failures reported by a persistence adapter, passed through unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Transient storage error: {0}")]
    Transient(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Caller misuse: nothing armed, malformed property value, bad page
    #[error("Validation error: {0}")]
    Validation(String),

    /// The id is no longer in the store
    #[error("Variable not found: {0}")]
    NotFound(VariableId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
