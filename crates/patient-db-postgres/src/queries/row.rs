use patient_core::{BloodType, Gender, PatientRecord};
use sqlx_core::row::Row;
use sqlx_postgres::PgRow;

use crate::error::{PostgresError, Result};

/// Decodes a row selected with `PATIENT_COLUMNS` into a record.
pub fn decode_patient(row: &PgRow) -> Result<PatientRecord> {
    let gender: String = row.try_get("gender")?;
    let gender = gender
        .parse::<Gender>()
        .map_err(|e| PostgresError::decode(e.to_string()))?;

    let blood_type: Option<String> = row.try_get("blood_type")?;
    let blood_type = blood_type
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<BloodType>())
        .transpose()
        .map_err(|e| PostgresError::decode(e.to_string()))?;

    Ok(PatientRecord {
        id: row.try_get("id")?,
        medical_record_no: row.try_get("medical_record_no")?,
        national_id: row.try_get("national_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender,
        blood_type,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        province: row.try_get("province")?,
        postal_code: row.try_get("postal_code")?,
        emergency_contact: row.try_get("emergency_contact")?,
        emergency_phone: row.try_get("emergency_phone")?,
        insurance_provider: row.try_get("insurance_provider")?,
        insurance_number: row.try_get("insurance_number")?,
        allergies: row.try_get("allergies")?,
        chronic_conditions: row.try_get("chronic_conditions")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}
