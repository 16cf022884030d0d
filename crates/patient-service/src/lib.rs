//! # patient-service
//!
//! The patient lifecycle service: the only place the registry's business
//! rules are enforced. It validates content, pre-checks national-ID
//! uniqueness, assigns identifiers and medical record numbers, soft-deletes,
//! normalizes list requests and projects the public view. Persistence is
//! delegated to any [`patient_storage::PatientStore`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use patient_db_memory::InMemoryPatientStore;
//! use patient_service::{PatientInput, PatientService};
//!
//! let service = PatientService::new(Arc::new(InMemoryPatientStore::new()));
//! let created = service.create(&input, "user-42").await?;
//! let view = service.get_public_view(&created.id).await?;
//! ```

pub mod error;
pub mod filter;
pub mod input;
pub mod mrn;
pub mod service;
pub mod validation;

pub use error::{ErrorCategory, PatientError, Result};
pub use filter::{NormalizedFilter, PageLimits, PatientFilter, PatientList, total_pages};
pub use input::{BirthDate, PatientInput};
pub use mrn::{MrnGenerator, RandomMrnGenerator};
pub use service::{PatientService, ServiceSettings};
pub use validation::{ValidatedPatient, validate};
