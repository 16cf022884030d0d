use std::collections::HashMap;
use std::sync::Arc;

use patient_core::{PatientRecord, next_update_timestamp, now_utc};
use patient_storage::{NaturalKey, PatientPage, PatientQuery, StorageError, UniqueKey};
use tokio::sync::RwLock;

use crate::query;

/// Rows plus the secondary indexes that back the unique keys.
#[derive(Debug, Default)]
pub(crate) struct Table {
    /// Every row ever inserted, active or not, keyed by id.
    rows: HashMap<String, PatientRecord>,
    /// national_id -> id, active rows only.
    by_national_id: HashMap<String, String>,
    /// medical_record_no -> id, all rows.
    by_mrn: HashMap<String, String>,
}

/// In-memory patient record store.
///
/// This store provides:
/// - Atomic enforcement of all unique keys under a single write lock
/// - Soft delete (rows are never removed)
/// - Filtering, sorting and pagination matching the PostgreSQL backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryPatientStore {
    pub(crate) table: Arc<RwLock<Table>>,
}

impl InMemoryPatientStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, including soft-deleted ones.
    pub async fn row_count(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Reads a row regardless of its active flag.
    pub async fn get_any(&self, id: &str) -> Option<PatientRecord> {
        self.table.read().await.rows.get(id).cloned()
    }
}

impl Table {
    pub(crate) fn insert(&mut self, record: &PatientRecord) -> Result<(), StorageError> {
        if self.rows.contains_key(&record.id) {
            return Err(StorageError::conflict(UniqueKey::Id));
        }
        if self.by_mrn.contains_key(&record.medical_record_no) {
            return Err(StorageError::conflict(UniqueKey::MedicalRecordNo));
        }
        if record.is_active && self.by_national_id.contains_key(&record.national_id) {
            return Err(StorageError::conflict(UniqueKey::NationalId));
        }

        self.by_mrn
            .insert(record.medical_record_no.clone(), record.id.clone());
        if record.is_active {
            self.by_national_id
                .insert(record.national_id.clone(), record.id.clone());
        }
        self.rows.insert(record.id.clone(), record.clone());
        Ok(())
    }

    pub(crate) fn get_active(&self, id: &str) -> Result<&PatientRecord, StorageError> {
        self.rows
            .get(id)
            .filter(|r| r.is_active)
            .ok_or_else(|| StorageError::not_found(id))
    }

    pub(crate) fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<&PatientRecord, StorageError> {
        let index = match key {
            NaturalKey::NationalId => &self.by_national_id,
            NaturalKey::MedicalRecordNo => &self.by_mrn,
        };

        index
            .get(value)
            .and_then(|id| self.rows.get(id))
            .filter(|r| r.is_active)
            .ok_or_else(|| StorageError::not_found(value))
    }

    pub(crate) fn update(&mut self, record: &PatientRecord) -> Result<(), StorageError> {
        let existing = self
            .rows
            .get(&record.id)
            .filter(|r| r.is_active)
            .ok_or_else(|| StorageError::not_found(&record.id))?;

        let old_national_id = existing.national_id.clone();
        if old_national_id != record.national_id
            && self
                .by_national_id
                .get(&record.national_id)
                .is_some_and(|owner| owner != &record.id)
        {
            return Err(StorageError::conflict(UniqueKey::NationalId));
        }

        let row = self
            .rows
            .get_mut(&record.id)
            .ok_or_else(|| StorageError::not_found(&record.id))?;

        row.national_id = record.national_id.clone();
        row.first_name = record.first_name.clone();
        row.last_name = record.last_name.clone();
        row.date_of_birth = record.date_of_birth;
        row.gender = record.gender;
        row.blood_type = record.blood_type;
        row.phone = record.phone.clone();
        row.email = record.email.clone();
        row.address = record.address.clone();
        row.city = record.city.clone();
        row.province = record.province.clone();
        row.postal_code = record.postal_code.clone();
        row.emergency_contact = record.emergency_contact.clone();
        row.emergency_phone = record.emergency_phone.clone();
        row.insurance_provider = record.insurance_provider.clone();
        row.insurance_number = record.insurance_number.clone();
        row.allergies = record.allergies.clone();
        row.chronic_conditions = record.chronic_conditions.clone();
        row.updated_by = record.updated_by.clone();
        row.updated_at = next_update_timestamp(row.updated_at, record.updated_at);

        if old_national_id != record.national_id {
            self.by_national_id.remove(&old_national_id);
            self.by_national_id
                .insert(record.national_id.clone(), record.id.clone());
        }
        Ok(())
    }

    pub(crate) fn soft_delete(&mut self, id: &str) -> Result<(), StorageError> {
        let row = self
            .rows
            .get_mut(id)
            .filter(|r| r.is_active)
            .ok_or_else(|| StorageError::not_found(id))?;

        row.is_active = false;
        row.updated_at = next_update_timestamp(row.updated_at, now_utc());
        let national_id = row.national_id.clone();
        self.by_national_id.remove(&national_id);
        Ok(())
    }

    pub(crate) fn list(&self, q: &PatientQuery) -> PatientPage {
        let mut matching: Vec<&PatientRecord> =
            self.rows.values().filter(|r| query::matches(r, q)).collect();
        let total = matching.len() as u64;

        matching.sort_by(|a, b| query::compare(a, b, q.sort, q.order));

        let offset = usize::try_from(q.offset).unwrap_or(usize::MAX);
        let records = matching
            .into_iter()
            .skip(offset)
            .take(q.limit as usize)
            .cloned()
            .collect();

        PatientPage::new(records, total)
    }
}
