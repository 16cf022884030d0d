//! Lifecycle tests against the in-memory store and failing store doubles.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use patient_core::{Gender, PatientRecord, now_utc, today_utc};
use patient_db_memory::InMemoryPatientStore;
use patient_service::{
    MrnGenerator, PageLimits, PatientError, PatientFilter, PatientInput, PatientService,
    ServiceSettings,
};
use patient_storage::{
    NaturalKey, PatientPage, PatientQuery, PatientStore, StorageError,
};
use time::macros::{date, datetime};
use time::{Date, Duration};

const ACTOR: &str = "user-1";

fn john() -> PatientInput {
    PatientInput {
        national_id: "1234567890123456".into(),
        first_name: "John".into(),
        last_name: Some("Doe".into()),
        date_of_birth: Some(date!(1990-01-01).into()),
        gender: "MALE".into(),
        phone: "081234567890".into(),
        email: Some("john@example.com".into()),
        address: Some("Jl. Merdeka 1".into()),
        insurance_number: Some("0001234567890".into()),
        allergies: Some("penicillin".into()),
        ..Default::default()
    }
}

fn input_with_nik(n: u32) -> PatientInput {
    PatientInput {
        national_id: format!("{n:016}"),
        first_name: format!("Patient{n:02}"),
        ..john()
    }
}

fn memory_service() -> (PatientService, InMemoryPatientStore) {
    let store = InMemoryPatientStore::new();
    (PatientService::new(Arc::new(store.clone())), store)
}

fn is_mrn(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == 3
        && parts[0] == "RM"
        && parts[1].len() == 8
        && parts[1].chars().all(|c| c.is_ascii_digit())
        && parts[2].len() == 5
        && parts[2].chars().all(|c| c.is_ascii_digit())
}

/// Hands out a fixed list of MRN candidates.
struct ScriptedMrns(Mutex<VecDeque<String>>);

impl ScriptedMrns {
    fn new(values: &[&str]) -> Self {
        Self(Mutex::new(values.iter().map(|s| s.to_string()).collect()))
    }
}

impl MrnGenerator for ScriptedMrns {
    fn generate(&self, _today: Date) -> String {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "RM-EXHAUSTED".into())
    }
}

/// A store whose natural-key lookups never find anything, as if a
/// concurrent insert landed between the pre-check and the write.
struct BlindLookupStore(InMemoryPatientStore);

#[async_trait]
impl PatientStore for BlindLookupStore {
    async fn insert(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.0.insert(record).await
    }

    async fn get_by_id(&self, id: &str) -> Result<PatientRecord, StorageError> {
        self.0.get_by_id(id).await
    }

    async fn get_by_natural_key(
        &self,
        _key: NaturalKey,
        value: &str,
    ) -> Result<PatientRecord, StorageError> {
        Err(StorageError::not_found(value))
    }

    async fn update(&self, record: &PatientRecord) -> Result<(), StorageError> {
        self.0.update(record).await
    }

    async fn soft_delete(&self, id: &str) -> Result<(), StorageError> {
        self.0.soft_delete(id).await
    }

    async fn list(&self, query: &PatientQuery) -> Result<PatientPage, StorageError> {
        self.0.list(query).await
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        self.0.exists(id).await
    }

    fn backend_name(&self) -> &'static str {
        "blind"
    }
}

/// A store that is always down.
struct DownStore;

#[async_trait]
impl PatientStore for DownStore {
    async fn insert(&self, _record: &PatientRecord) -> Result<(), StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn get_by_id(&self, _id: &str) -> Result<PatientRecord, StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn get_by_natural_key(
        &self,
        _key: NaturalKey,
        _value: &str,
    ) -> Result<PatientRecord, StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn update(&self, _record: &PatientRecord) -> Result<(), StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn soft_delete(&self, _id: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn list(&self, _query: &PatientQuery) -> Result<PatientPage, StorageError> {
        Err(StorageError::internal("relation \"patients\" does not exist"))
    }

    async fn exists(&self, _id: &str) -> Result<bool, StorageError> {
        Err(StorageError::unavailable("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "down"
    }
}

fn seeded_record(n: u32) -> PatientRecord {
    let ts = datetime!(2024-01-01 00:00:00 UTC) + Duration::minutes(i64::from(n));
    PatientRecord {
        id: format!("seed-{n:02}"),
        medical_record_no: format!("RM-20240101-{n:05}"),
        national_id: format!("{:016}", 9_000 + n),
        first_name: format!("Seed{n:02}"),
        last_name: None,
        date_of_birth: date!(1980-05-05),
        gender: Gender::Female,
        blood_type: None,
        phone: "0811".into(),
        email: None,
        address: None,
        city: None,
        province: None,
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
        created_by: "seed".into(),
        updated_by: "seed".into(),
    }
}

#[tokio::test]
async fn test_create_assigns_identity_and_audit_fields() {
    let (service, _) = memory_service();

    let created = service.create(&john(), ACTOR).await.unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.national_id, "1234567890123456");
    assert!(is_mrn(&created.medical_record_no), "{}", created.medical_record_no);
    assert!(created.is_active);
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.created_by, ACTOR);
    assert_eq!(created.updated_by, ACTOR);
    assert_eq!(created.gender, Gender::Male);
}

#[tokio::test]
async fn test_duplicate_national_id_is_rejected() {
    let (service, store) = memory_service();
    service.create(&john(), ACTOR).await.unwrap();

    let err = service.create(&john(), ACTOR).await.unwrap_err();
    assert_eq!(err, PatientError::duplicate_key("national-ID"));
    assert_eq!(store.row_count().await, 1);
}

#[tokio::test]
async fn test_get_returns_created_record() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    assert_eq!(service.get(&created.id).await.unwrap(), created);
    assert_eq!(service.get(&created.id).await.unwrap(), created);

    assert!(service.get("never-created").await.unwrap_err().is_not_found());
    assert_eq!(service.get("").await.unwrap_err().code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_delete_semantics() {
    let (service, store) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    service.delete(&created.id).await.unwrap();
    assert!(service.get(&created.id).await.unwrap_err().is_not_found());
    assert!(service.delete(&created.id).await.unwrap_err().is_not_found());
    assert!(service.delete("never-created").await.unwrap_err().is_not_found());
    assert_eq!(service.delete(" ").await.unwrap_err().code(), "INVALID_INPUT");

    // Row is kept, and its national ID can be registered again
    assert_eq!(store.row_count().await, 1);
    let again = service.create(&john(), ACTOR).await.unwrap();
    assert_ne!(again.id, created.id);
    assert_ne!(again.medical_record_no, created.medical_record_no);
}

#[tokio::test]
async fn test_update_with_future_date_of_birth_fails() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let mut input = john();
    input.date_of_birth = Some((today_utc() + Duration::days(1)).into());
    let err = service.update(&created.id, &input, ACTOR).await.unwrap_err();

    assert_eq!(
        err,
        PatientError::invalid_data("date-of-birth", "cannot be in the future")
    );
}

#[tokio::test]
async fn test_update_ignores_supplied_mrn_of_any_length() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let mut input = john();
    input.medical_record_no = Some("X".repeat(60));
    let updated = service.update(&created.id, &input, ACTOR).await.unwrap();

    assert_eq!(updated.medical_record_no, created.medical_record_no);
}

#[tokio::test]
async fn test_create_rejects_overlong_mrn() {
    let (service, store) = memory_service();
    let mut input = john();
    input.medical_record_no = Some("X".repeat(60));

    let err = service.create(&input, ACTOR).await.unwrap_err();
    assert_eq!(
        err,
        PatientError::invalid_data("medical-record-number", "too long")
    );
    assert_eq!(store.row_count().await, 0);
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_identity() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let mut input = john();
    input.first_name = "Johnny".into();
    input.last_name = None;
    input.allergies = None;
    input.blood_type = Some("O+".into());
    input.medical_record_no = Some("RM-19990101-99999".into());

    let updated = service.update(&created.id, &input, "user-2").await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.first_name, "Johnny");
    assert_eq!(updated.last_name, None);
    assert_eq!(updated.allergies, None);
    assert_eq!(updated.blood_type.map(|b| b.as_str()), Some("O+"));
    assert_eq!(updated.medical_record_no, created.medical_record_no);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.created_by, ACTOR);
    assert_eq!(updated.updated_by, "user-2");
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_national_id_uniqueness() {
    let (service, _) = memory_service();
    let first = service.create(&input_with_nik(1), ACTOR).await.unwrap();
    let second = service.create(&input_with_nik(2), ACTOR).await.unwrap();

    // Taking someone else's national ID
    let err = service
        .update(&second.id, &input_with_nik(1), ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err, PatientError::duplicate_key("national-ID"));

    // Keeping your own is fine
    service
        .update(&first.id, &input_with_nik(1), ACTOR)
        .await
        .unwrap();

    // Moving to a free one is fine
    let moved = service
        .update(&second.id, &input_with_nik(3), ACTOR)
        .await
        .unwrap();
    assert_eq!(moved.national_id, format!("{:016}", 3));
}

#[tokio::test]
async fn test_update_missing_record() {
    let (service, _) = memory_service();
    let err = service.update("nope", &john(), ACTOR).await.unwrap_err();
    assert!(err.is_not_found());

    let err = service.update("", &john(), ACTOR).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_list_paginates_with_total() {
    let (service, _) = memory_service();
    for n in 1..=25 {
        service.create(&input_with_nik(n), ACTOR).await.unwrap();
    }

    let list = service
        .list(&PatientFilter {
            page: 1,
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(list.records.len(), 10);
    assert_eq!(list.total, 25);
    assert_eq!(list.total_pages, 3);
    assert_eq!(list.page, 1);
    assert_eq!(list.page_size, 10);

    let last = service
        .list(&PatientFilter {
            page: 3,
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(last.records.len(), 5);
    assert_eq!(last.total, 25);
}

#[tokio::test]
async fn test_list_unknown_sort_falls_back_to_created_at_desc() {
    let (service, store) = memory_service();
    for n in [3, 1, 5, 2, 4] {
        store.insert(&seeded_record(n)).await.unwrap();
    }

    let list = service
        .list(&PatientFilter {
            sort: Some("password".into()),
            order: Some("upwards".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<&str> = list.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["seed-05", "seed-04", "seed-03", "seed-02", "seed-01"]);
}

#[tokio::test]
async fn test_list_search_and_exact_filters() {
    let (service, _) = memory_service();
    let mut a = input_with_nik(1);
    a.first_name = "Siti".into();
    a.city = Some("Bandung".into());
    let mut b = input_with_nik(2);
    b.first_name = "Budi".into();
    b.city = Some("Jakarta".into());
    service.create(&a, ACTOR).await.unwrap();
    let budi = service.create(&b, ACTOR).await.unwrap();

    let list = service
        .list(&PatientFilter {
            search: Some("BUD".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.records[0].first_name, "Budi");

    let list = service
        .list(&PatientFilter {
            search: Some(budi.medical_record_no.to_lowercase()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list.total, 1);

    let list = service
        .list(&PatientFilter {
            city: Some("Bandung".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.records[0].first_name, "Siti");

    let list = service
        .list(&PatientFilter {
            city: Some("bandung".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list.total, 0);
}

#[tokio::test]
async fn test_list_excludes_soft_deleted() {
    let (service, _) = memory_service();
    let a = service.create(&input_with_nik(1), ACTOR).await.unwrap();
    service.create(&input_with_nik(2), ACTOR).await.unwrap();
    service.delete(&a.id).await.unwrap();

    let list = service.list(&PatientFilter::default()).await.unwrap();
    assert_eq!(list.total, 1);
    assert!(list.records.iter().all(|r| r.id != a.id));
}

#[tokio::test]
async fn test_list_respects_configured_page_limits() {
    let store = InMemoryPatientStore::new();
    let service = PatientService::with_parts(
        Arc::new(store),
        Arc::new(ScriptedMrns::new(&[])),
        ServiceSettings {
            page_limits: PageLimits {
                default_page_size: 2,
                max_page_size: 3,
            },
            ..Default::default()
        },
    );
    for n in 1..=5 {
        service
            .create(
                &PatientInput {
                    medical_record_no: Some(format!("MRN-{n}")),
                    ..input_with_nik(n)
                },
                ACTOR,
            )
            .await
            .unwrap();
    }

    let list = service.list(&PatientFilter::default()).await.unwrap();
    assert_eq!((list.records.len(), list.total_pages), (2, 3));

    let list = service
        .list(&PatientFilter {
            limit: 50,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!((list.records.len(), list.total_pages), (3, 2));
}

#[tokio::test]
async fn test_public_view_withholds_sensitive_fields() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let view = service.get_public_view(&created.id).await.unwrap();
    assert_eq!(view.id, created.id);
    assert_eq!(view.medical_record_no, created.medical_record_no);
    assert_eq!(view.first_name, "John");
    assert_eq!(view.last_name.as_deref(), Some("Doe"));
    assert_eq!(view.gender, Gender::Male);

    let json = serde_json::to_value(&view).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 5);
    for hidden in ["phone", "email", "address", "insurance_number", "allergies", "national_id"] {
        assert!(!obj.contains_key(hidden), "leaked {hidden}");
    }

    assert!(
        service
            .get_public_view("missing")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_lookup_by_national_id() {
    let (service, _) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let found = service.get_by_national_id("1234567890123456").await.unwrap();
    assert_eq!(found.id, created.id);

    let found = service
        .get_by_natural_key(NaturalKey::MedicalRecordNo, &created.medical_record_no)
        .await
        .unwrap();
    assert_eq!(found.id, created.id);

    assert_eq!(
        service.get_by_national_id("  ").await.unwrap_err().code(),
        "INVALID_INPUT"
    );

    service.delete(&created.id).await.unwrap();
    assert!(
        service
            .get_by_national_id("1234567890123456")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_validation_runs_before_storage() {
    let service = PatientService::new(Arc::new(DownStore));

    let mut input = john();
    input.national_id = "short".into();
    let err = service.create(&input, ACTOR).await.unwrap_err();
    assert_eq!(err.field(), Some("national-ID"));

    let err = service.create(&john(), "").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_storage_failures_propagate() {
    let service = PatientService::new(Arc::new(DownStore));

    let err = service.create(&john(), ACTOR).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.code(), "STORAGE_UNAVAILABLE");

    assert!(service.get("p-1").await.unwrap_err().is_retryable());
    assert!(service.delete("p-1").await.unwrap_err().is_retryable());

    let err = service.list(&PatientFilter::default()).await.unwrap_err();
    assert_eq!(err.code(), "INTERNAL");
}

#[tokio::test]
async fn test_store_constraint_is_final_arbiter_for_national_id() {
    let inner = InMemoryPatientStore::new();
    let service = PatientService::new(Arc::new(BlindLookupStore(inner.clone())));

    service.create(&john(), ACTOR).await.unwrap();
    let err = service.create(&john(), ACTOR).await.unwrap_err();

    assert_eq!(err, PatientError::duplicate_key("national-ID"));
    assert_eq!(inner.row_count().await, 1);
}

#[tokio::test]
async fn test_generated_mrn_collision_is_retried() {
    let store = InMemoryPatientStore::new();
    let mut taken = seeded_record(1);
    taken.medical_record_no = "RM-20240101-00001".into();
    store.insert(&taken).await.unwrap();

    let service = PatientService::with_parts(
        Arc::new(store),
        Arc::new(ScriptedMrns::new(&[
            "RM-20240101-00001",
            "RM-20240101-00001",
            "RM-20240101-00002",
        ])),
        ServiceSettings::default(),
    );

    let created = service.create(&john(), ACTOR).await.unwrap();
    assert_eq!(created.medical_record_no, "RM-20240101-00002");
}

#[tokio::test]
async fn test_generated_mrn_exhaustion_is_internal() {
    let store = InMemoryPatientStore::new();
    let mut taken = seeded_record(1);
    taken.medical_record_no = "RM-20240101-00001".into();
    store.insert(&taken).await.unwrap();

    let service = PatientService::with_parts(
        Arc::new(store.clone()),
        Arc::new(ScriptedMrns::new(&[
            "RM-20240101-00001",
            "RM-20240101-00001",
            "RM-20240101-00001",
            "RM-20240101-00009",
        ])),
        ServiceSettings {
            mrn_max_attempts: 3,
            ..Default::default()
        },
    );

    let err = service.create(&john(), ACTOR).await.unwrap_err();
    assert_eq!(err.code(), "INTERNAL");
    assert_eq!(store.row_count().await, 1);
}

#[tokio::test]
async fn test_supplied_mrn_collision_is_duplicate_key() {
    let (service, _) = memory_service();
    let mut first = input_with_nik(1);
    first.medical_record_no = Some("MRN-CUSTOM-1".into());
    let created = service.create(&first, ACTOR).await.unwrap();
    assert_eq!(created.medical_record_no, "MRN-CUSTOM-1");

    let mut second = input_with_nik(2);
    second.medical_record_no = Some("MRN-CUSTOM-1".into());
    let err = service.create(&second, ACTOR).await.unwrap_err();
    assert_eq!(err, PatientError::duplicate_key("medical-record-number"));
}

#[tokio::test]
async fn test_updated_at_moves_forward_on_every_mutation() {
    let (service, store) = memory_service();
    let created = service.create(&john(), ACTOR).await.unwrap();

    let first = service.update(&created.id, &john(), ACTOR).await.unwrap();
    let second = service.update(&created.id, &john(), ACTOR).await.unwrap();
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);

    service.delete(&created.id).await.unwrap();
    let deleted = store.get_any(&created.id).await.unwrap();
    assert!(deleted.updated_at > second.updated_at);
    assert!(deleted.updated_at <= now_utc() + Duration::seconds(1));
}
