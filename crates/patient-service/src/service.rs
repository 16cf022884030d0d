//! The patient lifecycle service.

use std::sync::Arc;

use patient_core::{PatientPublicView, PatientRecord, generate_id, now_utc, today_utc};
use patient_storage::{DynPatientStore, NaturalKey, StorageError, UniqueKey};
use tracing::{debug, info, instrument, warn};

use crate::error::{NATIONAL_ID_KEY, PatientError, Result};
use crate::filter::{PageLimits, PatientFilter, PatientList};
use crate::input::PatientInput;
use crate::mrn::{MrnGenerator, RandomMrnGenerator};
use crate::validation::{ValidatedPatient, validate};

/// Default number of insert attempts with freshly generated MRNs.
pub const DEFAULT_MRN_MAX_ATTEMPTS: u32 = 3;

/// Tunables for the lifecycle service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub page_limits: PageLimits,
    /// Insert attempts when the generated MRN collides (at least 1).
    pub mrn_max_attempts: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            page_limits: PageLimits::default(),
            mrn_max_attempts: DEFAULT_MRN_MAX_ATTEMPTS,
        }
    }
}

/// Enforces the patient business rules on top of a record store.
///
/// Uniqueness pre-checks here only produce friendlier errors; the store's
/// atomic constraints are what actually reject duplicates.
#[derive(Clone)]
pub struct PatientService {
    store: DynPatientStore,
    mrn: Arc<dyn MrnGenerator>,
    settings: ServiceSettings,
}

impl PatientService {
    /// Creates a service with the default MRN generator and settings.
    pub fn new(store: DynPatientStore) -> Self {
        Self::with_parts(
            store,
            Arc::new(RandomMrnGenerator::default()),
            ServiceSettings::default(),
        )
    }

    pub fn with_parts(
        store: DynPatientStore,
        mrn: Arc<dyn MrnGenerator>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            mrn,
            settings,
        }
    }

    pub fn store(&self) -> &DynPatientStore {
        &self.store
    }

    pub fn settings(&self) -> ServiceSettings {
        self.settings
    }

    /// Validates and stores a new patient, returning the stored record.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `actor` is empty
    /// - `InvalidData` on the first failing validation rule
    /// - `DuplicateKey` if the national ID (or a supplied MRN) is taken
    /// - `Internal` if every generated MRN collided
    #[instrument(skip(self, input), fields(actor = %actor))]
    pub async fn create(&self, input: &PatientInput, actor: &str) -> Result<PatientRecord> {
        require_actor(actor)?;
        let patient = validate(input, today_utc())?;

        self.ensure_national_id_free(&patient.national_id, None)
            .await?;

        let supplied_mrn = patient.medical_record_no.clone();
        let attempts = if supplied_mrn.is_some() {
            1
        } else {
            self.settings.mrn_max_attempts.max(1)
        };

        let now = now_utc();
        let mut record = new_record(patient, actor, now);

        for attempt in 1..=attempts {
            record.medical_record_no = match &supplied_mrn {
                Some(mrn) => mrn.clone(),
                None => self.mrn.generate(now.date()),
            };

            match self.store.insert(&record).await {
                Ok(()) => {
                    info!(id = %record.id, mrn = %record.medical_record_no, "Patient created");
                    return Ok(self.store.get_by_id(&record.id).await?);
                }
                Err(e) if e.conflict_key() == Some(UniqueKey::MedicalRecordNo) => {
                    if supplied_mrn.is_some() {
                        return Err(e.into());
                    }
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        "Generated medical record number collided, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PatientError::internal(format!(
            "could not assign a unique medical record number after {attempts} attempts"
        )))
    }

    /// Reads an active patient by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<PatientRecord> {
        require_id(id)?;
        Ok(self.store.get_by_id(id).await?)
    }

    /// Reads an active patient by a natural key.
    #[instrument(skip(self, value), fields(key = %key))]
    pub async fn get_by_natural_key(&self, key: NaturalKey, value: &str) -> Result<PatientRecord> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PatientError::invalid_input(format!("{key} is required")));
        }
        Ok(self.store.get_by_natural_key(key, value).await?)
    }

    /// Reads an active patient by national ID.
    pub async fn get_by_national_id(&self, national_id: &str) -> Result<PatientRecord> {
        self.get_by_natural_key(NaturalKey::NationalId, national_id)
            .await
    }

    /// Replaces the mutable fields of an active patient.
    ///
    /// The medical record number, identifier and creation audit fields are
    /// carried over from the stored record.
    #[instrument(skip(self, input), fields(actor = %actor))]
    pub async fn update(
        &self,
        id: &str,
        input: &PatientInput,
        actor: &str,
    ) -> Result<PatientRecord> {
        require_id(id)?;
        require_actor(actor)?;

        let existing = self.store.get_by_id(id).await?;
        let content = PatientInput {
            medical_record_no: None,
            ..input.clone()
        };
        let patient = validate(&content, today_utc())?;

        if patient.national_id != existing.national_id {
            self.ensure_national_id_free(&patient.national_id, Some(id))
                .await?;
        }

        let mut record = new_record(patient, actor, now_utc());
        record.id = existing.id;
        record.medical_record_no = existing.medical_record_no;
        record.created_at = existing.created_at;
        record.created_by = existing.created_by;

        self.store.update(&record).await?;
        info!(id = %record.id, "Patient updated");

        Ok(self.store.get_by_id(&record.id).await?)
    }

    /// Soft-deletes an active patient.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id(id)?;

        if !self.store.exists(id).await? {
            return Err(PatientError::not_found(id));
        }

        self.store.soft_delete(id).await?;
        info!(id = %id, "Patient soft-deleted");
        Ok(())
    }

    /// Lists active patients with normalized paging, sorting and filters.
    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: &PatientFilter) -> Result<PatientList> {
        let normalized = filter.normalize(self.settings.page_limits);
        debug!(
            page = normalized.page,
            page_size = normalized.page_size,
            sort = normalized.query.sort.column(),
            order = normalized.query.order.keyword(),
            "Listing patients"
        );

        let page = self.store.list(&normalized.query).await?;

        Ok(PatientList::new(
            page.records,
            page.total,
            normalized.page,
            normalized.page_size,
        ))
    }

    /// Returns the non-sensitive projection of an active patient.
    #[instrument(skip(self))]
    pub async fn get_public_view(&self, id: &str) -> Result<PatientPublicView> {
        let record = self.get(id).await?;
        Ok(record.public_view())
    }

    /// Fails with `DuplicateKey` if an active record other than `owner`
    /// holds `national_id`.
    async fn ensure_national_id_free(&self, national_id: &str, owner: Option<&str>) -> Result<()> {
        match self
            .store
            .get_by_natural_key(NaturalKey::NationalId, national_id)
            .await
        {
            Ok(found) if Some(found.id.as_str()) == owner => Ok(()),
            Ok(found) => {
                warn!(existing_id = %found.id, "National ID already registered");
                Err(PatientError::duplicate_key(NATIONAL_ID_KEY))
            }
            Err(StorageError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(PatientError::invalid_input("patient id is required"));
    }
    Ok(())
}

fn require_actor(actor: &str) -> Result<()> {
    if actor.trim().is_empty() {
        return Err(PatientError::invalid_input("actor is required"));
    }
    Ok(())
}

/// Builds an active record with a fresh id; the MRN is filled in by the caller.
fn new_record(patient: ValidatedPatient, actor: &str, now: time::OffsetDateTime) -> PatientRecord {
    PatientRecord {
        id: generate_id(),
        medical_record_no: patient.medical_record_no.unwrap_or_default(),
        national_id: patient.national_id,
        first_name: patient.first_name,
        last_name: patient.last_name,
        date_of_birth: patient.date_of_birth,
        gender: patient.gender,
        blood_type: patient.blood_type,
        phone: patient.phone,
        email: patient.email,
        address: patient.address,
        city: patient.city,
        province: patient.province,
        postal_code: patient.postal_code,
        emergency_contact: patient.emergency_contact,
        emergency_phone: patient.emergency_phone,
        insurance_provider: patient.insurance_provider,
        insurance_number: patient.insurance_number,
        allergies: patient.allergies,
        chronic_conditions: patient.chronic_conditions,
        is_active: true,
        created_at: now,
        updated_at: now,
        created_by: actor.to_string(),
        updated_by: actor.to_string(),
    }
}
