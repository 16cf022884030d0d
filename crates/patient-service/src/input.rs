//! Caller-supplied patient content, before validation.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Patient content as supplied on create and update.
///
/// Enumerated fields arrive as free text and are only turned into typed
/// values by validation. Update has full-replace semantics: an absent
/// optional field clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInput {
    /// Caller-chosen medical record number; generated when absent.
    /// Ignored on update.
    pub medical_record_no: Option<String>,
    #[serde(alias = "nik")]
    pub national_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<BirthDate>,
    pub gender: String,
    pub blood_type: Option<String>,
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

/// Date of birth as supplied: a calendar date, or text still to be read as one.
///
/// Unreadable text is kept so that validation can report it against the
/// date-of-birth field instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BirthDate {
    Date(Date),
    Text(String),
}

impl BirthDate {
    /// The calendar date, from `YYYY-MM-DD` or an RFC 3339 timestamp.
    ///
    /// A timestamp contributes the date as written, in its own offset.
    pub fn resolve(&self) -> Option<Date> {
        match self {
            BirthDate::Date(date) => Some(*date),
            BirthDate::Text(text) => {
                let text = text.trim();
                Date::parse(text, format_description!("[year]-[month]-[day]"))
                    .ok()
                    .or_else(|| {
                        OffsetDateTime::parse(text, &Rfc3339)
                            .ok()
                            .map(|at| at.date())
                    })
            }
        }
    }
}

impl From<Date> for BirthDate {
    fn from(date: Date) -> Self {
        BirthDate::Date(date)
    }
}
