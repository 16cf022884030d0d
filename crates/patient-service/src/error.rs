//! Lifecycle error taxonomy.
//!
//! Every failure the service reports is one of these variants, each with a
//! stable machine code for the transport layer.

use std::fmt;

use patient_storage::{StorageError, UniqueKey};

/// Key name reported for national-ID collisions.
pub const NATIONAL_ID_KEY: &str = "national-ID";

/// Key name reported for medical record number collisions.
pub const MEDICAL_RECORD_NO_KEY: &str = "medical-record-number";

/// Errors returned by the patient lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientError {
    /// A required caller-supplied value is missing or malformed.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Record content failed a business rule.
    #[error("Invalid {field}: {reason}")]
    InvalidData {
        field: &'static str,
        reason: String,
    },

    /// A unique key is already taken.
    #[error("Duplicate {key}")]
    DuplicateKey { key: String },

    /// No active record matches.
    #[error("Patient not found: {id}")]
    NotFound { id: String },

    /// Transient storage failure; safe to retry.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Unexpected failure.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PatientError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_data(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidData { .. } => "INVALID_DATA",
            Self::DuplicateKey { .. } => "DUPLICATE_KEY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    /// The offending field, for validation failures.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidData { field, .. } => Some(*field),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::InvalidData { .. } => ErrorCategory::Validation,
            Self::DuplicateKey { .. } => ErrorCategory::Conflict,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::StorageUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Key name for a unique constraint, as reported in `DuplicateKey`.
pub fn key_name(key: UniqueKey) -> &'static str {
    match key {
        UniqueKey::Id => "id",
        UniqueKey::NationalId => NATIONAL_ID_KEY,
        UniqueKey::MedicalRecordNo => MEDICAL_RECORD_NO_KEY,
    }
}

impl From<StorageError> for PatientError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => Self::NotFound { id },
            // Identifiers are random UUIDs; a collision is not the caller's doing
            StorageError::Conflict {
                key: Some(UniqueKey::Id),
            } => Self::internal("identifier collision"),
            StorageError::Conflict { key: Some(key) } => Self::duplicate_key(key_name(key)),
            StorageError::Conflict { key: None } => Self::duplicate_key("unique-key"),
            StorageError::Unavailable { message } => Self::StorageUnavailable { message },
            StorageError::Internal { message } => Self::Internal { message },
        }
    }
}

/// Categories of lifecycle errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Infrastructure,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::NotFound => write!(f, "not_found"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, PatientError>;
