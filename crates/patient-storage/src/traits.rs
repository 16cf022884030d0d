//! Storage traits for the record store abstraction layer.

use std::sync::Arc;

use async_trait::async_trait;
use patient_core::PatientRecord;

use crate::error::StorageError;
use crate::types::{NaturalKey, PatientPage, PatientQuery};

/// Durable storage of patient records, independent of business rules.
///
/// Every read path sees active records only: a soft-deleted record behaves
/// exactly like one that never existed. Implementations must be thread-safe
/// (`Send + Sync`) and must enforce the unique keys atomically, since the
/// lifecycle service's own existence checks are not.
///
/// # Example
///
/// ```ignore
/// use patient_storage::{PatientStore, StorageError};
///
/// async fn name_of(store: &dyn PatientStore, id: &str) -> Result<String, StorageError> {
///     Ok(store.get_by_id(id).await?.first_name)
/// }
/// ```
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Persists a fully populated record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the identifier, the medical record
    /// number, or (among active rows) the national ID is already taken.
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError>;

    /// Reads an active record by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no active record matches.
    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError>;

    /// Reads an active record by one of its natural keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no active record matches.
    async fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError>;

    /// Replaces the mutable fields of an active record, keyed by `record.id`.
    ///
    /// Identifier, medical record number, creation audit fields and the
    /// active flag are left untouched. `updated_at` is stored strictly after
    /// the previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no active row was affected.
    /// Returns `StorageError::Conflict` if the new national ID is taken.
    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError>;

    /// Marks an active record inactive and refreshes its `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no active row was affected,
    /// including when the record was already soft-deleted.
    async fn soft_delete(&self, id: &str) -> Result<(), StorageError>;

    /// Returns one page of active records matching the query, plus the
    /// total count of matches.
    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError>;

    /// Returns whether an active record with this identifier exists.
    async fn exists(&self, id: &str) -> Result<bool, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<T: PatientStore + ?Sized> PatientStore for Arc<T> {
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError> {
        (**self).insert(record).await
    }

    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError> {
        (**self).get_by_id(id).await
    }

    async fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError> {
        (**self).get_by_natural_key(key, value).await
    }

    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError> {
        (**self).update(record).await
    }

    async fn soft_delete(&self, id: &str) -> Result<(), StorageError> {
        (**self).soft_delete(id).await
    }

    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError> {
        (**self).list(query).await
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        (**self).exists(id).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
