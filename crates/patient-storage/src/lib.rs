//! # patient-storage
//!
//! Record store abstraction layer for the patient registry.
//!
//! This crate defines the traits and types that all store backends must implement.
//! It does not contain any backends - those are provided by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`PatientStore`], which defines the contract for:
//! - Insert, read, update and soft delete of patient records
//! - Lookup by natural key (national ID, medical record number)
//! - Filtered, sorted, paginated listing with a total count
//!
//! ## Example
//!
//! ```ignore
//! use patient_storage::{PatientQuery, PatientStore, SortField, StorageError};
//!
//! async fn patients_in(
//!     store: &dyn PatientStore,
//!     city: &str,
//! ) -> Result<u64, StorageError> {
//!     let query = PatientQuery {
//!         city: Some(city.to_string()),
//!         sort: SortField::LastName,
//!         ..Default::default()
//!     };
//!     Ok(store.list(&query).await?.total)
//! }
//! ```

pub mod deadline;
mod error;
mod traits;
mod types;

// Re-export everything from submodules
pub use deadline::DeadlineStore;
pub use error::{ErrorCategory, StorageError};
pub use traits::PatientStore;
pub use types::{NaturalKey, PatientPage, PatientQuery, SortField, SortOrder, UniqueKey};

/// Type alias for a shared store trait object.
pub type DynPatientStore = std::sync::Arc<dyn PatientStore>;
