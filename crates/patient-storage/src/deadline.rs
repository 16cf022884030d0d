//! DeadlineStore - A store wrapper that bounds every operation by a deadline.
//!
//! This wrapper delegates all operations to an inner store while racing each
//! call against a timer. A call that outlives its deadline is abandoned and
//! reported as [`StorageError::Unavailable`].
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use patient_storage::DeadlineStore;
//!
//! let store = DeadlineStore::new(postgres_store, Duration::from_secs(5));
//!
//! // Fails with StorageError::Unavailable if the database stalls for 5s
//! store.get_by_id(&id).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use patient_core::PatientRecord;
use tracing::warn;

use crate::error::StorageError;
use crate::traits::PatientStore;
use crate::types::{NaturalKey, PatientPage, PatientQuery};

/// A store wrapper that fails operations which exceed a fixed deadline.
///
/// Dropping the inner future cancels it; for SQL backends this returns the
/// connection to the pool without waiting for the statement.
pub struct DeadlineStore<S: PatientStore> {
    /// The inner store implementation.
    inner: S,
    /// Upper bound on a single store call.
    timeout: Duration,
}

impl<S: PatientStore> DeadlineStore<S> {
    /// Create a new deadline wrapper.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Get a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get the configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    backend = self.inner.backend_name(),
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store operation exceeded deadline"
                );
                Err(StorageError::unavailable(format!(
                    "{operation} exceeded deadline of {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<S: PatientStore> PatientStore for DeadlineStore<S> {
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.bounded("insert", self.inner.insert(record)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError> {
        self.bounded("get_by_id", self.inner.get_by_id(id)).await
    }

    async fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError> {
        self.bounded(
            "get_by_natural_key",
            self.inner.get_by_natural_key(key, value),
        )
        .await
    }

    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.bounded("update", self.inner.update(record)).await
    }

    async fn soft_delete(&self, id: &str) -> Result<(), StorageError> {
        self.bounded("soft_delete", self.inner.soft_delete(id)).await
    }

    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError> {
        self.bounded("list", self.inner.list(query)).await
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        self.bounded("exists", self.inner.exists(id)).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
