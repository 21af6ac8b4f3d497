use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, PatientError};
use crate::services::PatientService;

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::Validation(msg) => AppError::ValidationError(msg),
        PatientError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);
    let patients = service.list_patients().await.map_err(map_patient_error)?;

    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::new(&state);
    let patient = service
        .create_patient(request)
        .await
        .map_err(map_patient_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "patient": patient }))))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);
    service
        .delete_patient(patient_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!({ "ok": true })))
}
