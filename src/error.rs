//! Error types shared by the store and the application services.

use thiserror::Error;

/// Errors raised by persistence and service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    StorePoisoned,
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound { entity, id: id.into() }
    }

    /// True when the error came from input validation rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
