//! Error types for the onboarding engine.
//!
//! Rejected transitions are not errors: they come back as
//! [`ValidationResult`] values. The variants below cover infrastructure
//! failures (persistence) and programmer errors (preconditions).

use std::path::PathBuf;

use thiserror::Error;

use crate::validator::ValidationResult;

/// Comprehensive error type for all engine operations.
#[derive(Error, Debug)]
pub enum OnboardingError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration and runtime plumbing errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A transition method was called before `initialize`
    #[error("State machine used before initialize() was called")]
    NotInitialized,
    /// A step name that the registry does not know
    #[error("Unknown onboarding step '{name}'")]
    UnknownStep { name: String },
    /// A transition the validator refused, for callers that opted into
    /// treating rejections as errors via [`ValidationResult::into_result`]
    #[error("Transition rejected: {0}")]
    Rejected(ValidationResult),
}

impl OnboardingError {
    /// Creates a new database error with additional context.
    pub fn database(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    /// Wraps a `spawn_blocking` join failure.
    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {e}"),
        }
    }

    /// Returns true for errors raised by the persistence layer.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Database { .. }
                | Self::FileSystem { .. }
                | Self::Serialization { .. }
                | Self::Configuration { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| OnboardingError::database(message, e))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, OnboardingError>;
