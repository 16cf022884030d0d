//! In-memory patient record store.
//!
//! This crate provides an in-memory implementation of the `PatientStore` trait
//! from `patient-storage`, guarded by a single `tokio::sync::RwLock` so that
//! unique-key checks and writes happen atomically.
//!
//! # Example
//!
//! ```ignore
//! use patient_db_memory::InMemoryPatientStore;
//! use patient_storage::PatientStore;
//!
//! let store = InMemoryPatientStore::new();
//! store.insert(&record).await?;
//! let found = store.get_by_id(&record.id).await?;
//! ```

mod query;
pub mod storage;
mod store_impl;

// Re-export the PatientStore trait for convenience
pub use patient_storage::{PatientStore, StorageError};

pub use storage::InMemoryPatientStore;
