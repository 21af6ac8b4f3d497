use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::{DoctorService, ScheduleConfigService};

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);
    let doctor = service.get_doctor(doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_working_hours(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    // 404 for an unknown doctor; an empty template list is a valid answer.
    let doctor_service = DoctorService::new(&state);
    doctor_service
        .get_doctor(doctor_id)
        .await
        .map_err(map_doctor_error)?;

    let schedule_service = ScheduleConfigService::new(&state);
    let templates = schedule_service
        .templates_for(doctor_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "working_hours": templates
    })))
}
