//! Error types for the PostgreSQL record store.

use patient_storage::{StorageError, UniqueKey};
use sqlx_core::error::Error as SqlxError;

/// Name of the primary key constraint on `patients`.
pub const PATIENTS_PKEY: &str = "patients_pkey";

/// Name of the global unique constraint on `patients.medical_record_no`.
pub const PATIENTS_MRN_KEY: &str = "patients_medical_record_no_key";

/// Name of the partial unique index on active `patients.national_id`.
pub const PATIENTS_NATIONAL_ID_ACTIVE: &str = "idx_patients_national_id_active";

/// PostgreSQL error code for admin shutdown (57P01).
pub const PG_ADMIN_SHUTDOWN: &str = "57P01";

/// PostgreSQL error code for crash shutdown (57P02).
pub const PG_CRASH_SHUTDOWN: &str = "57P02";

/// PostgreSQL error code for "cannot connect now" (57P03).
pub const PG_CANNOT_CONNECT_NOW: &str = "57P03";

/// PostgreSQL error code for statement cancelled by timeout (57014).
pub const PG_QUERY_CANCELED: &str = "57014";

/// Maps a violated constraint name back to the unique key it guards.
pub fn unique_key_for_constraint(constraint: &str) -> Option<UniqueKey> {
    match constraint {
        PATIENTS_PKEY => Some(UniqueKey::Id),
        PATIENTS_MRN_KEY => Some(UniqueKey::MedicalRecordNo),
        PATIENTS_NATIONAL_ID_ACTIVE => Some(UniqueKey::NationalId),
        _ => None,
    }
}

/// Returns whether the server reported a connection-class or shutdown failure.
fn is_transient_code(code: &str) -> bool {
    code.starts_with("08")
        || matches!(
            code,
            PG_ADMIN_SHUTDOWN | PG_CRASH_SHUTDOWN | PG_CANNOT_CONNECT_NOW | PG_QUERY_CANCELED
        )
}

/// Classifies a driver error into the record store taxonomy.
pub fn classify(err: SqlxError) -> StorageError {
    match &err {
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint().and_then(unique_key_for_constraint) {
                Some(key) => StorageError::conflict(key),
                None => StorageError::conflict_unknown(),
            }
        }
        SqlxError::Database(db_err) if db_err.code().as_deref().is_some_and(is_transient_code) => {
            StorageError::unavailable(err.to_string())
        }
        SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::WorkerCrashed
        | SqlxError::Io(_)
        | SqlxError::Tls(_) => StorageError::unavailable(err.to_string()),
        _ => StorageError::internal(err.to_string()),
    }
}

/// Errors specific to the PostgreSQL record store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database driver error.
    #[error("Database error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Schema bootstrap error.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A stored row could not be decoded into a record.
    #[error("Corrupt row: {message}")]
    Decode { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => classify(e),
            PostgresError::Schema(e) => StorageError::internal(format!("Schema error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
            PostgresError::Decode { message } => {
                StorageError::internal(format!("Corrupt row: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
