//! SQL query modules for the PostgreSQL record store.
//!
//! This module contains the SQL query implementations organized by operation type.

pub mod crud;
pub mod list;
mod row;

pub use row::decode_patient;

/// Columns selected for a full patient row, in table order.
pub(crate) const PATIENT_COLUMNS: &str = "id, medical_record_no, national_id, first_name, \
     last_name, date_of_birth, gender, blood_type, phone, email, address, city, province, \
     postal_code, emergency_contact, emergency_phone, insurance_provider, insurance_number, \
     allergies, chronic_conditions, is_active, created_at, updated_at, created_by, updated_by";
