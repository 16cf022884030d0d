//! HTTP adapter over the lifecycle service.

pub mod actor;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    Router,
    routing::get,
};
use patient_service::PatientService;

pub use actor::{ACTOR_HEADER, Actor};
pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: PatientService,
}

impl AppState {
    pub fn new(service: PatientService) -> Self {
        Self { service }
    }
}

/// Routes mounted under `/api/v1`.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/by-national-id/{national_id}",
            get(handlers::get_patient_by_national_id),
        )
        .route(
            "/patients/{id}",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/patients/{id}/public", get(handlers::get_public_view))
        .with_state(state)
}
