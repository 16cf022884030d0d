//! PostgreSQL implementation of the PatientStore trait.

use async_trait::async_trait;
use patient_core::PatientRecord;
use patient_storage::{NaturalKey, PatientPage, PatientQuery, PatientStore, StorageError};
use sqlx_postgres::PgPool;
use tracing::{debug, instrument};

use crate::config::PostgresConfig;
use crate::pool;
use crate::queries::{crud, list};
use crate::schema::SchemaManager;

/// PostgreSQL record store for patient master data.
///
/// Unique keys are enforced by the database: the primary key, a unique
/// constraint on the medical record number and a partial unique index on the
/// national ID of active rows. Violations come back as
/// `StorageError::Conflict` carrying the key that fired.
#[derive(Debug, Clone)]
pub struct PostgresPatientStore {
    pool: PgPool,
    schema_manager: SchemaManager,
}

impl PostgresPatientStore {
    /// Creates a new `PostgresPatientStore` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Bootstrap the schema (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if schema bootstrap fails.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;
        let schema_manager = SchemaManager::new(pool.clone());

        if config.ensure_schema {
            schema_manager.ensure_schema().await?;
        }

        Ok(Self {
            pool,
            schema_manager,
        })
    }

    /// Creates a new `PostgresPatientStore` from an existing connection pool.
    ///
    /// The schema is not bootstrapped automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        let schema_manager = SchemaManager::new(pool.clone());
        Self {
            pool,
            schema_manager,
        }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the schema manager.
    #[must_use]
    pub fn schema(&self) -> &SchemaManager {
        &self.schema_manager
    }
}

#[async_trait]
impl PatientStore for PostgresPatientStore {
    #[instrument(skip(self, record), fields(id = %record.id, mrn = %record.medical_record_no))]
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError> {
        crud::insert(&self.pool, record)
            .await
            .map_err(StorageError::from)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError> {
        crud::find_by_id(&self.pool, id)
            .await
            .map_err(StorageError::from)?
            .ok_or_else(|| StorageError::not_found(id))
    }

    #[instrument(skip(self, value), fields(key = %key))]
    async fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError> {
        crud::find_by_natural_key(&self.pool, key, value)
            .await
            .map_err(StorageError::from)?
            .ok_or_else(|| StorageError::not_found(value))
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError> {
        let affected = crud::update(&self.pool, record)
            .await
            .map_err(StorageError::from)?;

        if affected == 0 {
            return Err(StorageError::not_found(&record.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: &str) -> Result<(), StorageError> {
        let affected = crud::soft_delete(&self.pool, id)
            .await
            .map_err(StorageError::from)?;

        if affected == 0 {
            return Err(StorageError::not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, query), fields(sort = ?query.sort, limit = query.limit, offset = query.offset))]
    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError> {
        let page = list::list(&self.pool, query)
            .await
            .map_err(StorageError::from)?;

        debug!(returned = page.len(), total = page.total, "Listed patients");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        crud::exists(&self.pool, id)
            .await
            .map_err(StorageError::from)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
