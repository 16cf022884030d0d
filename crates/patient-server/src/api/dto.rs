//! Request and response bodies.

use patient_core::{BloodType, Gender, PatientRecord};
use patient_service::{PatientFilter, PatientList};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// A patient as returned to clients; audit actor ids are not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientResponse {
    pub id: String,
    pub medical_record_no: String,
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
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PatientRecord> for PatientResponse {
    fn from(r: PatientRecord) -> Self {
        Self {
            id: r.id,
            medical_record_no: r.medical_record_no,
            national_id: r.national_id,
            first_name: r.first_name,
            last_name: r.last_name,
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            blood_type: r.blood_type,
            phone: r.phone,
            email: r.email,
            address: r.address,
            city: r.city,
            province: r.province,
            postal_code: r.postal_code,
            emergency_contact: r.emergency_contact,
            emergency_phone: r.emergency_phone,
            insurance_provider: r.insurance_provider,
            insurance_number: r.insurance_number,
            allergies: r.allergies,
            chronic_conditions: r.chronic_conditions,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Query string of `GET /patients`.
///
/// Numbers are kept as text so that garbage falls back to defaults instead
/// of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

fn lenient_int(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

impl From<ListParams> for PatientFilter {
    fn from(p: ListParams) -> Self {
        PatientFilter {
            page: lenient_int(p.page.as_deref()),
            limit: lenient_int(p.limit.as_deref()),
            search: p.search,
            city: p.city,
            province: p.province,
            sort: p.sort,
            order: p.order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientListResponse {
    pub data: Vec<PatientResponse>,
    pub pagination: Pagination,
}

impl From<PatientList> for PatientListResponse {
    fn from(list: PatientList) -> Self {
        Self {
            pagination: Pagination {
                page: list.page,
                limit: list.page_size,
                total: list.total,
                total_pages: list.total_pages,
            },
            data: list.records.into_iter().map(PatientResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
