//! Patient master-data record and its public projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::error::{CoreError, Result};

/// Administrative gender recorded on a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(CoreError::invalid_gender(other)),
        }
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|bt| bt.as_str() == s)
            .ok_or_else(|| CoreError::invalid_blood_type(s))
    }
}

/// A patient master-data record as held by the record store.
///
/// `id`, `created_at` and `created_by` are assigned once at creation.
/// `medical_record_no` is never reassigned after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Opaque system-generated identifier.
    pub id: String,
    /// Medical record number, unique across active and soft-deleted rows.
    pub medical_record_no: String,
    /// National identity number (16 characters), unique among active rows.
    pub national_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Date,
    pub gender: Gender,
    pub blood_type: Option<BloodType>,

    // Contact
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,

    // Emergency contact
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,

    // Insurance
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,

    // Clinical notes (free text)
    pub allergies: Option<String>,
    pub chronic_conditions: Option<String>,

    /// `false` once the record has been soft-deleted.
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: String,
    pub updated_by: String,
}

impl PatientRecord {
    /// Returns the non-sensitive projection of this record.
    pub fn public_view(&self) -> PatientPublicView {
        PatientPublicView::from(self)
    }
}

/// Restricted projection exposing only identification fields.
///
/// Contact, clinical and insurance data are not part of this type at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPublicView {
    pub id: String,
    pub medical_record_no: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: Gender,
}

impl From<&PatientRecord> for PatientPublicView {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id.clone(),
            medical_record_no: record.medical_record_no.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            gender: record.gender,
        }
    }
}
