use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ScheduleError, SuggestAppointmentRequest};
use crate::services::{AvailabilityService, SuggestionService};

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        ScheduleError::ConfigurationMissing => {
            AppError::ConfigurationMissing("Doctor has no working hours configured".to_string())
        }
        ScheduleError::Database(msg) => AppError::Database(msg),
    }
}

/// Dates arrive as `YYYY-MM-DD` path/body strings and are rejected
/// before any appointment query runs.
fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {}", raw)))
}

#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&date)?;

    let service = AvailabilityService::new(&state);
    let slots = service
        .available_slots(doctor_id, date)
        .await
        .map_err(map_schedule_error)?;

    let times: Vec<String> = slots.iter().map(|s| s.format("%H:%M").to_string()).collect();
    Ok(Json(json!(times)))
}

#[axum::debug_handler]
pub async fn suggest_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SuggestAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&request.date)?;

    let service = SuggestionService::new(&state);
    let suggestions = service
        .suggest(request.doctor_id, date, Utc::now())
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "suggestions": suggestions,
        "doctor_id": request.doctor_id,
        "date": request.date,
    })))
}
