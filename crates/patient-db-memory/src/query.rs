use std::cmp::Ordering;

use patient_core::PatientRecord;
use patient_storage::{PatientQuery, SortField, SortOrder};

/// Returns whether an active record satisfies the query's filters.
pub(crate) fn matches(record: &PatientRecord, query: &PatientQuery) -> bool {
    if !record.is_active {
        return false;
    }

    if let Some(city) = &query.city
        && record.city.as_deref() != Some(city.as_str())
    {
        return false;
    }

    if let Some(province) = &query.province
        && record.province.as_deref() != Some(province.as_str())
    {
        return false;
    }

    match &query.search {
        Some(term) => matches_search(record, &term.to_lowercase()),
        None => true,
    }
}

/// Case-insensitive substring match over the searchable columns.
fn matches_search(record: &PatientRecord, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);

    contains(&record.first_name)
        || record.last_name.as_deref().is_some_and(contains)
        || contains(&record.national_id)
        || contains(&record.medical_record_no)
}

/// Orders two records by the query's sort field and direction, then by id.
///
/// Names compare case-insensitively, falling back to the raw text when they
/// fold to the same value. Absent last names sort after present ones when
/// ascending and before them when descending, the same placement PostgreSQL
/// gives NULLs by default.
pub(crate) fn compare(
    a: &PatientRecord,
    b: &PatientRecord,
    field: SortField,
    order: SortOrder,
) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::FirstName => by_name(&a.first_name, &b.first_name),
        SortField::LastName => nulls_last(a.last_name.as_deref(), b.last_name.as_deref()),
        SortField::NationalId => a.national_id.cmp(&b.national_id),
    };

    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };

    primary.then_with(|| a.id.cmp(&b.id))
}

fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => by_name(a, b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
