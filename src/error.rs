//! Unified error hierarchy for fitlab
//!
//! The computation core is total over well-typed input and never returns
//! these errors. They belong to the boundaries around it: form validation,
//! document storage, identity resolution and configuration.

use thiserror::Error;

/// Top-level error type for all fitlab operations
#[derive(Debug, Error)]
pub enum FitLabError {
    /// Input rejected at the form/log boundary
    #[error("Validation error: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity token could not be resolved
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Document store specific errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite backend failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Path does not name a document
    #[error("Invalid document path: {path}")]
    InvalidPath { path: String },

    /// Merge target or merge value is not a JSON object
    #[error("Document is not an object: {path}")]
    NotObject { path: String },

    /// Store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for FitLabError {
    fn from(err: rusqlite::Error) -> Self {
        FitLabError::Store(StoreError::Sqlite(err))
    }
}

/// Result type alias for fitlab operations
pub type Result<T> = std::result::Result<T, FitLabError>;

impl FitLabError {
    /// Shorthand for a field validation failure
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FitLabError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FitLabError::Validation { .. } => ErrorSeverity::Warning,
            FitLabError::NotFound(_) => ErrorSeverity::Warning,
            FitLabError::Auth(_) => ErrorSeverity::Error,
            FitLabError::Configuration(_) => ErrorSeverity::Error,
            FitLabError::Store(StoreError::Poisoned) => ErrorSeverity::Critical,
            FitLabError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FitLabError::Validation { field, reason } => {
                format!("Please check {}: {}", field, reason)
            }
            FitLabError::Auth(_) => "Invalid authentication token".to_string(),
            FitLabError::Configuration(reason) => {
                format!("Invalid configuration: {}. Run `fitlab config --show` to inspect it.", reason)
            }
            FitLabError::Store(_) => {
                "Unable to access stored data. Please check your configuration.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
