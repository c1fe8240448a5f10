//! Error types for the synonyms library.
//!
//! All errors are represented by the [`SynonymsError`] enum. Unsupported
//! operators and storage kinds are deliberately *not* errors: providers and
//! extractors signal them with `Option`/outcome values, and the federation
//! layer treats them as "no contribution".

use anyhow;
use thiserror::Error;

/// The main error type for synonyms operations.
///
/// Uses the `thiserror` crate for automatic `Error` trait implementation and
/// provides convenient constructor methods for creating specific error types.
#[derive(Error, Debug)]
pub enum SynonymsError {
    /// Registration or resolution misconfiguration (unknown behavior,
    /// malformed contributor registration). Always surfaced to the caller.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A provider's storage backend failed during search or extraction.
    /// Recovered at the federation boundary into a diagnostics entry.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A federated task exceeded its timeout budget.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// A condition leaf still carried the virtual-column placeholder when a
    /// backend was asked to execute it.
    #[error("Unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error (host collaborator failures)
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SynonymsError.
pub type Result<T> = std::result::Result<T, SynonymsError>;

impl SynonymsError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        SynonymsError::Configuration(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        SynonymsError::Backend(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        SynonymsError::Timeout(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        SynonymsError::Cancelled(msg.into())
    }

    /// Create a new unresolved-placeholder error.
    pub fn unresolved_placeholder<S: Into<String>>(msg: S) -> Self {
        SynonymsError::UnresolvedPlaceholder(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SynonymsError::Other(msg.into())
    }

    /// Check whether this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SynonymsError::Configuration(_))
    }
}
