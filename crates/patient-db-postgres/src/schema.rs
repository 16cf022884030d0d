//! Schema management for the PostgreSQL record store.
//!
//! Patients live in a single `patients` table. Soft-deleted rows stay in the
//! same table with `is_active = FALSE`, so the national-ID uniqueness is a
//! partial unique index over active rows while the medical record number is
//! a plain (global) unique constraint.

use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{PostgresError, Result};

const CREATE_PATIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    id                  TEXT         NOT NULL,
    medical_record_no   VARCHAR(50)  NOT NULL,
    national_id         VARCHAR(16)  NOT NULL,
    first_name          VARCHAR(100) NOT NULL,
    last_name           VARCHAR(100),
    date_of_birth       DATE         NOT NULL,
    gender              VARCHAR(10)  NOT NULL,
    blood_type          VARCHAR(5),
    phone               VARCHAR(20)  NOT NULL,
    email               VARCHAR(100),
    address             VARCHAR(255),
    city                VARCHAR(100),
    province            VARCHAR(100),
    postal_code         VARCHAR(10),
    emergency_contact   VARCHAR(100),
    emergency_phone     VARCHAR(20),
    insurance_provider  VARCHAR(100),
    insurance_number    VARCHAR(50),
    allergies           TEXT,
    chronic_conditions  TEXT,
    is_active           BOOLEAN      NOT NULL DEFAULT TRUE,
    created_at          TIMESTAMPTZ  NOT NULL,
    updated_at          TIMESTAMPTZ  NOT NULL,
    created_by          TEXT         NOT NULL,
    updated_by          TEXT         NOT NULL,
    CONSTRAINT patients_pkey PRIMARY KEY (id),
    CONSTRAINT patients_medical_record_no_key UNIQUE (medical_record_no)
)
"#;

const CREATE_INDEXES: [&str; 4] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_patients_national_id_active \
     ON patients (national_id) WHERE is_active",
    "CREATE INDEX IF NOT EXISTS idx_patients_national_id ON patients (national_id)",
    "CREATE INDEX IF NOT EXISTS idx_patients_name ON patients (first_name, last_name)",
    "CREATE INDEX IF NOT EXISTS idx_patients_active_created_at \
     ON patients (created_at) WHERE is_active",
];

/// Manages the database schema for patient records.
///
/// Bootstrap is idempotent; it never alters or drops existing objects.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    /// Creates a new `SchemaManager` with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `patients` table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<()> {
        if self.table_exists("patients").await? {
            debug!("Table patients exists, ensuring indexes");
        } else {
            info!("Creating patients table");
            self.execute_ddl(CREATE_PATIENTS_TABLE).await?;
        }

        for ddl in CREATE_INDEXES {
            self.execute_ddl(ddl).await?;
        }

        Ok(())
    }

    /// Checks if a table exists in the public schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx_core::query_as::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn execute_ddl(&self, ddl: &str) -> Result<()> {
        sqlx_core::query::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| PostgresError::Schema(e.to_string()))?;
        Ok(())
    }
}
