//! Implementation of the PatientStore trait for InMemoryPatientStore.

use async_trait::async_trait;
use patient_core::PatientRecord;
use patient_storage::{NaturalKey, PatientPage, PatientQuery, PatientStore, StorageError};

use crate::storage::InMemoryPatientStore;

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.table.write().await.insert(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError> {
        self.table.read().await.get_active(id).cloned()
    }

    async fn get_by_natural_key(
        &self,
        key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError> {
        self.table
            .read()
            .await
            .get_by_natural_key(key, value)
            .cloned()
    }

    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.table.write().await.update(record)
    }

    async fn soft_delete(&self, id: &str) -> Result<(), StorageError> {
        self.table.write().await.soft_delete(id)
    }

    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError> {
        Ok(self.table.read().await.list(query))
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.table.read().await.get_active(id).is_ok())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_core::Gender;
    use patient_storage::{SortField, SortOrder, UniqueKey};
    use time::Duration;
    use time::macros::{date, datetime};

    fn record(n: u32) -> PatientRecord {
        let ts = datetime!(2024-01-01 00:00:00 UTC) + Duration::minutes(i64::from(n));
        PatientRecord {
            id: format!("id-{n:03}"),
            medical_record_no: format!("RM-20240101-{n:05}"),
            national_id: format!("{n:016}"),
            first_name: format!("First{n:03}"),
            last_name: Some(format!("Last{n:03}")),
            date_of_birth: date!(1990-01-01),
            gender: Gender::Female,
            blood_type: None,
            phone: "081234567890".into(),
            email: None,
            address: None,
            city: Some("Bandung".into()),
            province: Some("Jawa Barat".into()),
            postal_code: None,
            emergency_contact: None,
            emergency_phone: None,
            insurance_provider: None,
            insurance_number: None,
            allergies: None,
            chronic_conditions: None,
            is_active: true,
            created_at: ts,
            updated_at: ts,
            created_by: "actor-1".into(),
            updated_by: "actor-1".into(),
        }
    }

    #[tokio::test]
    async fn test_store_basic_operations() {
        let store = InMemoryPatientStore::new();
        let r = record(1);

        store.insert(&r).await.unwrap();
        assert_eq!(store.get_by_id(&r.id).await.unwrap(), r);
        assert!(store.exists(&r.id).await.unwrap());
        assert!(!store.exists("nonexistent").await.unwrap());

        let by_nik = store
            .get_by_natural_key(NaturalKey::NationalId, &r.national_id)
            .await
            .unwrap();
        assert_eq!(by_nik.id, r.id);

        let by_mrn = store
            .get_by_natural_key(NaturalKey::MedicalRecordNo, &r.medical_record_no)
            .await
            .unwrap();
        assert_eq!(by_mrn.id, r.id);
    }

    #[tokio::test]
    async fn test_store_unique_keys() {
        let store = InMemoryPatientStore::new();
        store.insert(&record(1)).await.unwrap();

        let same_id = record(1);
        let err = store.insert(&same_id).await.unwrap_err();
        assert_eq!(err.conflict_key(), Some(UniqueKey::Id));

        let mut same_mrn = record(2);
        same_mrn.medical_record_no = record(1).medical_record_no;
        let err = store.insert(&same_mrn).await.unwrap_err();
        assert_eq!(err.conflict_key(), Some(UniqueKey::MedicalRecordNo));

        let mut same_nik = record(3);
        same_nik.national_id = record(1).national_id;
        let err = store.insert(&same_nik).await.unwrap_err();
        assert_eq!(err.conflict_key(), Some(UniqueKey::NationalId));

        assert_eq!(store.row_count().await, 1);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_row_and_frees_national_id() {
        let store = InMemoryPatientStore::new();
        let r = record(1);
        store.insert(&r).await.unwrap();

        store.soft_delete(&r.id).await.unwrap();
        assert!(store.get_by_id(&r.id).await.unwrap_err().is_not_found());
        assert!(!store.exists(&r.id).await.unwrap());
        assert!(
            store
                .get_by_natural_key(NaturalKey::MedicalRecordNo, &r.medical_record_no)
                .await
                .unwrap_err()
                .is_not_found()
        );

        // Row is retained, inactive, with a later updated_at
        let kept = store.get_any(&r.id).await.unwrap();
        assert!(!kept.is_active);
        assert!(kept.updated_at > r.updated_at);
        assert_eq!(store.row_count().await, 1);

        // Re-delete sees no active row
        assert!(store.soft_delete(&r.id).await.unwrap_err().is_not_found());

        // National ID may be reused by a new active record; MRN may not
        let mut again = record(2);
        again.national_id = r.national_id.clone();
        store.insert(&again).await.unwrap();

        let mut mrn_reuse = record(3);
        mrn_reuse.medical_record_no = r.medical_record_no.clone();
        assert_eq!(
            store.insert(&mrn_reuse).await.unwrap_err().conflict_key(),
            Some(UniqueKey::MedicalRecordNo)
        );
    }

    #[tokio::test]
    async fn test_update_replaces_mutable_fields_only() {
        let store = InMemoryPatientStore::new();
        let original = record(1);
        store.insert(&original).await.unwrap();

        let mut changed = original.clone();
        changed.first_name = "Renamed".into();
        changed.last_name = None;
        changed.medical_record_no = "RM-OTHER".into();
        changed.created_by = "intruder".into();
        changed.updated_by = "actor-2".into();
        // Clock went backwards
        changed.updated_at = original.updated_at - Duration::hours(1);

        store.update(&changed).await.unwrap();
        let stored = store.get_by_id(&original.id).await.unwrap();

        assert_eq!(stored.first_name, "Renamed");
        assert_eq!(stored.last_name, None);
        assert_eq!(stored.updated_by, "actor-2");
        assert_eq!(stored.medical_record_no, original.medical_record_no);
        assert_eq!(stored.created_by, original.created_by);
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_or_inactive_is_not_found() {
        let store = InMemoryPatientStore::new();
        assert!(store.update(&record(9)).await.unwrap_err().is_not_found());

        let r = record(1);
        store.insert(&r).await.unwrap();
        store.soft_delete(&r.id).await.unwrap();
        assert!(store.update(&r).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_national_id_conflict() {
        let store = InMemoryPatientStore::new();
        store.insert(&record(1)).await.unwrap();
        store.insert(&record(2)).await.unwrap();

        let mut moved = record(2);
        moved.national_id = record(1).national_id;
        let err = store.update(&moved).await.unwrap_err();
        assert_eq!(err.conflict_key(), Some(UniqueKey::NationalId));

        // Moving to a free national ID releases the old one
        let mut freed = record(2);
        freed.national_id = "9999999999999999".into();
        store.update(&freed).await.unwrap();

        let mut taker = record(3);
        taker.national_id = record(2).national_id;
        store.insert(&taker).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_pages_and_counts() {
        let store = InMemoryPatientStore::new();
        for n in 1..=25 {
            store.insert(&record(n)).await.unwrap();
        }
        store.soft_delete("id-025").await.unwrap();

        let page = store
            .list(&PatientQuery {
                limit: 10,
                offset: 20,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 24);
        assert_eq!(page.len(), 4);
        // created_at DESC: the oldest four remain for the last page
        let ids: Vec<&str> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id-004", "id-003", "id-002", "id-001"]);
    }

    #[tokio::test]
    async fn test_list_filters_and_sort() {
        let store = InMemoryPatientStore::new();
        for n in 1..=5 {
            let mut r = record(n);
            if n % 2 == 0 {
                r.city = Some("Jakarta".into());
            }
            store.insert(&r).await.unwrap();
        }

        let page = store
            .list(&PatientQuery {
                city: Some("Jakarta".into()),
                sort: SortField::FirstName,
                order: SortOrder::Asc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = page.records.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["First002", "First004"]);
        assert_eq!(page.total, 2);

        let page = store
            .list(&PatientQuery {
                search: Some("last003".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].id, "id-003");
    }

    #[tokio::test]
    async fn test_list_past_the_end_keeps_total() {
        let store = InMemoryPatientStore::new();
        for n in 1..=3 {
            store.insert(&record(n)).await.unwrap();
        }
        let page = store
            .list(&PatientQuery {
                offset: 30,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 3);
    }
}
