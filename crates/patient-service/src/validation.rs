//! Field validation shared by create and update.
//!
//! Rules run in a fixed order and the first failure wins, so callers always
//! see the same error for the same input.

use std::sync::LazyLock;

use patient_core::{BloodType, Gender};
use regex::Regex;
use time::Date;

use crate::error::{PatientError, Result};
use crate::input::PatientInput;

/// Required length of a national ID, in characters.
pub const NATIONAL_ID_LEN: usize = 16;

/// Longest caller-chosen medical record number, in characters.
pub const MRN_MAX_LEN: usize = 50;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex")
});

/// Patient content that passed every rule, with enumerations resolved and
/// text normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatient {
    pub medical_record_no: Option<String>,
    pub national_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Date,
    pub gender: Gender,
    pub blood_type: Option<BloodType>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
    pub allergies: Option<String>,
    pub chronic_conditions: Option<String>,
}

/// Trims an optional field; blank becomes absent.
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(PatientError::invalid_data(field, "too long")),
        _ => Ok(()),
    }
}

/// Validates patient content against `today` (UTC).
///
/// Order: national ID, first name, date of birth present, date of birth not
/// in the future, gender, phone, blood type, then length caps and email
/// format.
pub fn validate(input: &PatientInput, today: Date) -> Result<ValidatedPatient> {
    let national_id = input.national_id.trim();
    if national_id.chars().count() != NATIONAL_ID_LEN {
        return Err(PatientError::invalid_data(
            "national-ID",
            "must be 16 characters",
        ));
    }

    let first_name = input.first_name.trim();
    if first_name.is_empty() {
        return Err(PatientError::invalid_data("first-name", "required"));
    }

    let date_of_birth = input
        .date_of_birth
        .as_ref()
        .ok_or_else(|| PatientError::invalid_data("date-of-birth", "required"))?
        .resolve()
        .ok_or_else(|| PatientError::invalid_data("date-of-birth", "invalid date"))?;
    if date_of_birth > today {
        return Err(PatientError::invalid_data(
            "date-of-birth",
            "cannot be in the future",
        ));
    }

    let gender = input
        .gender
        .trim()
        .parse::<Gender>()
        .map_err(|_| PatientError::invalid_data("gender", "must be MALE or FEMALE"))?;

    let phone = input.phone.trim();
    if phone.is_empty() {
        return Err(PatientError::invalid_data("phone", "required"));
    }

    let blood_type = normalize(&input.blood_type)
        .map(|bt| bt.parse::<BloodType>())
        .transpose()
        .map_err(|_| PatientError::invalid_data("blood-type", "invalid"))?;

    let patient = ValidatedPatient {
        medical_record_no: normalize(&input.medical_record_no),
        national_id: national_id.to_string(),
        first_name: first_name.to_string(),
        last_name: normalize(&input.last_name),
        date_of_birth,
        gender,
        blood_type,
        phone: phone.to_string(),
        email: normalize(&input.email),
        address: normalize(&input.address),
        city: normalize(&input.city),
        province: normalize(&input.province),
        postal_code: normalize(&input.postal_code),
        emergency_contact: normalize(&input.emergency_contact),
        emergency_phone: normalize(&input.emergency_phone),
        insurance_provider: normalize(&input.insurance_provider),
        insurance_number: normalize(&input.insurance_number),
        allergies: normalize(&input.allergies),
        chronic_conditions: normalize(&input.chronic_conditions),
    };

    check_len("first-name", Some(&patient.first_name), 100)?;
    check_len("last-name", patient.last_name.as_deref(), 100)?;
    check_len("phone", Some(&patient.phone), 20)?;
    check_len("email", patient.email.as_deref(), 100)?;
    check_len("address", patient.address.as_deref(), 255)?;
    check_len("city", patient.city.as_deref(), 100)?;
    check_len("province", patient.province.as_deref(), 100)?;
    check_len("postal-code", patient.postal_code.as_deref(), 10)?;
    check_len("emergency-contact", patient.emergency_contact.as_deref(), 100)?;
    check_len("emergency-phone", patient.emergency_phone.as_deref(), 20)?;
    check_len(
        "insurance-provider",
        patient.insurance_provider.as_deref(),
        100,
    )?;
    check_len("insurance-number", patient.insurance_number.as_deref(), 50)?;
    check_len(
        "medical-record-number",
        patient.medical_record_no.as_deref(),
        MRN_MAX_LEN,
    )?;

    if let Some(email) = &patient.email
        && !EMAIL_REGEX.is_match(email)
    {
        return Err(PatientError::invalid_data("email", "invalid"));
    }

    Ok(patient)
}
