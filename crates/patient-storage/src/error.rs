//! Storage error types for the record store abstraction layer.
//!
//! Backends translate their driver errors into [`StorageError`] so the
//! lifecycle service only ever sees this taxonomy.

use std::fmt;

use crate::types::UniqueKey;

/// Errors that can occur during record store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No active record matches.
    #[error("Patient not found: {id}")]
    NotFound {
        /// The identifier or natural-key value that was looked up.
        id: String,
    },

    /// A write collided with an existing row on a unique key.
    #[error("Unique constraint violated on {}", conflict_key_name(.key))]
    Conflict {
        /// The constraint that fired, when the backend can tell.
        key: Option<UniqueKey>,
    },

    /// Transient infrastructure failure (connection loss, pool exhaustion,
    /// deadline exceeded). Safe to retry with backoff.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// Unexpected backend error not classified above.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

fn conflict_key_name(key: &Option<UniqueKey>) -> &'static str {
    key.map(|k| k.as_str()).unwrap_or("unknown key")
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a new `Conflict` error for a known constraint.
    #[must_use]
    pub fn conflict(key: UniqueKey) -> Self {
        Self::Conflict { key: Some(key) }
    }

    /// Creates a new `Conflict` error whose constraint could not be determined.
    #[must_use]
    pub fn conflict_unknown() -> Self {
        Self::Conflict { key: None }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a unique-key conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns the conflicting key, if this is a conflict on a known constraint.
    #[must_use]
    pub fn conflict_key(&self) -> Option<UniqueKey> {
        match self {
            Self::Conflict { key } => *key,
            _ => None,
        }
    }

    /// Returns `true` if the caller may retry the same operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Record not found.
    NotFound,
    /// Unique-key conflict.
    Conflict,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
