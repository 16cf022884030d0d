use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use patient_core::PatientPublicView;
use patient_service::{PatientFilter, PatientInput};

use super::AppState;
use super::actor::Actor;
use super::dto::{
    HealthResponse, ListParams, MessageResponse, PatientListResponse, PatientResponse,
};
use super::error::ApiError;

pub const SERVICE_NAME: &str = "patient-service";

type ApiResult<T> = Result<T, ApiError>;

fn body(payload: Result<Json<PatientInput>, JsonRejection>) -> ApiResult<PatientInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn create_patient(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let input = body(payload)?;
    let created = state.service.create(&input, actor.as_str()).await?;
    Ok((StatusCode::CREATED, Json(PatientResponse::from(created))))
}

pub async fn list_patients(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PatientListResponse>> {
    let filter = PatientFilter::from(params);
    let list = state.service.list(&filter).await?;
    Ok(Json(PatientListResponse::from(list)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientResponse>> {
    let record = state.service.get(&id).await?;
    Ok(Json(record.into()))
}

pub async fn get_patient_by_national_id(
    State(state): State<AppState>,
    _actor: Actor,
    Path(national_id): Path<String>,
) -> ApiResult<Json<PatientResponse>> {
    let record = state.service.get_by_national_id(&national_id).await?;
    Ok(Json(record.into()))
}

pub async fn update_patient(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<Json<PatientResponse>> {
    let input = body(payload)?;
    let updated = state.service.update(&id, &input, actor.as_str()).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.service.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Patient deleted successfully".into(),
    }))
}

pub async fn get_public_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientPublicView>> {
    Ok(Json(state.service.get_public_view(&id).await?))
}
