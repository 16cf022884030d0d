//! Single-row query implementations.
//!
//! Every read and write here is scoped to active rows; an inactive row is
//! indistinguishable from a missing one.

use patient_core::{PatientRecord, now_utc};
use patient_storage::NaturalKey;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;

use super::{PATIENT_COLUMNS, decode_patient};
use crate::error::Result;

/// Inserts a fully populated record.
pub async fn insert(pool: &PgPool, record: &PatientRecord) -> Result<()> {
    query(
        r#"
        INSERT INTO patients (
            id, medical_record_no, national_id, first_name, last_name,
            date_of_birth, gender, blood_type, phone, email, address, city,
            province, postal_code, emergency_contact, emergency_phone,
            insurance_provider, insurance_number, allergies, chronic_conditions,
            is_active, created_at, updated_at, created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
        "#,
    )
    .bind(&record.id)
    .bind(&record.medical_record_no)
    .bind(&record.national_id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(record.date_of_birth)
    .bind(record.gender.as_str())
    .bind(record.blood_type.map(|bt| bt.as_str()))
    .bind(&record.phone)
    .bind(&record.email)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.province)
    .bind(&record.postal_code)
    .bind(&record.emergency_contact)
    .bind(&record.emergency_phone)
    .bind(&record.insurance_provider)
    .bind(&record.insurance_number)
    .bind(&record.allergies)
    .bind(&record.chronic_conditions)
    .bind(record.is_active)
    .bind(record.created_at)
    .bind(record.updated_at)
    .bind(&record.created_by)
    .bind(&record.updated_by)
    .execute(pool)
    .await?;

    Ok(())
}

/// Reads an active record by id.
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<PatientRecord>> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 AND is_active");

    let row = query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(decode_patient).transpose()
}

/// Reads an active record by a natural key.
pub async fn find_by_natural_key(
    pool: &PgPool,
    key: NaturalKey,
    value: &str,
) -> Result<Option<PatientRecord>> {
    // Column comes from a closed enum, never from caller text
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE {} = $1 AND is_active",
        key.column()
    );

    let row = query(&sql).bind(value).fetch_optional(pool).await?;
    row.as_ref().map(decode_patient).transpose()
}

/// Replaces the mutable fields of an active record.
///
/// Returns the number of rows affected (0 or 1).
pub async fn update(pool: &PgPool, record: &PatientRecord) -> Result<u64> {
    let result = query(
        r#"
        UPDATE patients SET
            national_id = $2,
            first_name = $3,
            last_name = $4,
            date_of_birth = $5,
            gender = $6,
            blood_type = $7,
            phone = $8,
            email = $9,
            address = $10,
            city = $11,
            province = $12,
            postal_code = $13,
            emergency_contact = $14,
            emergency_phone = $15,
            insurance_provider = $16,
            insurance_number = $17,
            allergies = $18,
            chronic_conditions = $19,
            updated_by = $20,
            updated_at = GREATEST($21, updated_at + INTERVAL '1 microsecond')
        WHERE id = $1 AND is_active
        "#,
    )
    .bind(&record.id)
    .bind(&record.national_id)
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(record.date_of_birth)
    .bind(record.gender.as_str())
    .bind(record.blood_type.map(|bt| bt.as_str()))
    .bind(&record.phone)
    .bind(&record.email)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.province)
    .bind(&record.postal_code)
    .bind(&record.emergency_contact)
    .bind(&record.emergency_phone)
    .bind(&record.insurance_provider)
    .bind(&record.insurance_number)
    .bind(&record.allergies)
    .bind(&record.chronic_conditions)
    .bind(&record.updated_by)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Marks an active record inactive.
///
/// Returns the number of rows affected (0 or 1).
pub async fn soft_delete(pool: &PgPool, id: &str) -> Result<u64> {
    let result = query(
        r#"
        UPDATE patients SET
            is_active = FALSE,
            updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond')
        WHERE id = $1 AND is_active
        "#,
    )
    .bind(id)
    .bind(now_utc())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Returns whether an active record with this id exists.
pub async fn exists(pool: &PgPool, id: &str) -> Result<bool> {
    let exists: bool =
        query_scalar("SELECT EXISTS (SELECT 1 FROM patients WHERE id = $1 AND is_active)")
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}
