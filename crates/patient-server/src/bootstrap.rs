//! Builds the lifecycle service from configuration.
//!
//! Picks the record store backend, wraps it with the per-call deadline and
//! wires the MRN generator and paging limits.

use std::sync::Arc;

use patient_db_memory::InMemoryPatientStore;
use patient_db_postgres::{PostgresPatientStore, mask_password};
use patient_service::{PatientService, RandomMrnGenerator};
use patient_storage::{DeadlineStore, DynPatientStore, StorageError};
use tracing::info;

use crate::config::{AppConfig, StorageBackend};

/// Opens the configured record store, bounded by the operation deadline.
///
/// # Errors
///
/// Returns an error if the Postgres pool cannot be created, the database is
/// unreachable, or the schema bootstrap fails.
pub async fn build_store(cfg: &AppConfig) -> Result<DynPatientStore, StorageError> {
    let inner: DynPatientStore = match cfg.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory patient store; data is lost on restart");
            Arc::new(InMemoryPatientStore::new())
        }
        StorageBackend::Postgres => {
            let store_config = cfg.storage.postgres.to_store_config();
            info!(url = %mask_password(&store_config.url), "Connecting to PostgreSQL");
            Arc::new(PostgresPatientStore::new(store_config).await?)
        }
    };

    info!(
        backend = inner.backend_name(),
        operation_timeout_ms = cfg.storage.operation_timeout_ms,
        "Patient store ready"
    );

    Ok(Arc::new(DeadlineStore::new(inner, cfg.operation_timeout())))
}

/// Builds the lifecycle service on top of `store`.
pub fn build_service(cfg: &AppConfig, store: DynPatientStore) -> PatientService {
    PatientService::with_parts(
        store,
        Arc::new(RandomMrnGenerator::new(cfg.patients.mrn_prefix.trim())),
        cfg.service_settings(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_is_wrapped_with_deadline() {
        let cfg = AppConfig::default();
        let store = build_store(&cfg).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(!store.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_service_uses_configured_settings() {
        let mut cfg = AppConfig::default();
        cfg.patients.max_page_size = 40;
        let store = build_store(&cfg).await.unwrap();
        let service = build_service(&cfg, store);
        assert_eq!(service.settings().page_limits.max_page_size, 40);
    }
}
