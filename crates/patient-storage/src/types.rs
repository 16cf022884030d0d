//! Query and key types used by the record store traits.

use std::fmt;

use patient_core::PatientRecord;
use serde::{Deserialize, Serialize};

/// Caller-meaningful unique keys that records can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalKey {
    /// National identity number.
    NationalId,
    /// Medical record number.
    MedicalRecordNo,
}

impl NaturalKey {
    /// Physical column holding this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::MedicalRecordNo => "medical_record_no",
        }
    }

    /// Extracts this key's value from a record.
    pub fn value_of<'a>(&self, record: &'a PatientRecord) -> &'a str {
        match self {
            Self::NationalId => &record.national_id,
            Self::MedicalRecordNo => &record.medical_record_no,
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Unique constraints enforced atomically by every store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqueKey {
    /// Primary identifier.
    Id,
    /// National ID, unique among active records.
    NationalId,
    /// Medical record number, unique among all records.
    MedicalRecordNo,
}

impl UniqueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::NationalId => "national_id",
            Self::MedicalRecordNo => "medical_record_no",
        }
    }
}

impl From<NaturalKey> for UniqueKey {
    fn from(key: NaturalKey) -> Self {
        match key {
            NaturalKey::NationalId => Self::NationalId,
            NaturalKey::MedicalRecordNo => Self::MedicalRecordNo,
        }
    }
}

/// Allow-listed sort fields for patient listings.
///
/// Caller text is only ever mapped onto one of these variants; the physical
/// column name comes from [`SortField::column`], never from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    FirstName,
    LastName,
    NationalId,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::FirstName,
        SortField::LastName,
        SortField::NationalId,
    ];

    /// Looks up an allow-listed field by its logical name.
    ///
    /// Accepts `created_at`, `updated_at`, `first_name`, `last_name`,
    /// `national_id` (and the short form `nik`). Anything else is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "national_id" | "nik" => Some(Self::NationalId),
            _ => None,
        }
    }

    /// Physical column identifier for this field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::NationalId => "national_id",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses `asc`/`desc` case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if name.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    /// SQL keyword for this direction.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A normalized listing request, as handed to a store.
///
/// Only active records are ever listed. Text filters are applied as given:
/// `search` is a case-insensitive substring match over first name, last name,
/// national ID and medical record number; `city` and `province` are exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    /// Maximum number of records in the page.
    pub limit: u32,
    /// Number of matching records to skip.
    pub offset: u64,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            search: None,
            city: None,
            province: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            limit: 10,
            offset: 0,
        }
    }
}

/// One page of a listing plus the total number of matching records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPage {
    pub records: Vec<PatientRecord>,
    /// Count of all matching records, independent of the page window.
    pub total: u64,
}

impl PatientPage {
    #[must_use]
    pub fn new(records: Vec<PatientRecord>, total: u64) -> Self {
        Self { records, total }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_allow_list() {
        for field in SortField::ALL {
            assert_eq!(SortField::from_name(field.column()), Some(field));
        }
        assert_eq!(SortField::from_name("nik"), Some(SortField::NationalId));
        assert_eq!(SortField::from_name("phone"), None);
        assert_eq!(SortField::from_name("created_at; DROP TABLE patients"), None);
        assert_eq!(SortField::from_name("CREATED_AT"), None);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::from_name("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::from_name("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::from_name("Desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::from_name("sideways"), None);
        assert_eq!(SortOrder::default().keyword(), "DESC");
    }

    #[test]
    fn test_query_defaults() {
        let query = PatientQuery::default();
        assert_eq!(query.sort, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_unique_key_from_natural_key() {
        assert_eq!(
            UniqueKey::from(NaturalKey::NationalId),
            UniqueKey::NationalId
        );
        assert_eq!(
            UniqueKey::from(NaturalKey::MedicalRecordNo),
            UniqueKey::MedicalRecordNo
        );
    }
}
