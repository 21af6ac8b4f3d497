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

use crate::models::{AppointmentError, BookAppointmentRequest};
use crate::services::BookingService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::Conflict => {
            AppError::Conflict("Appointment slot conflicts with existing booking".to_string())
        }
        AppointmentError::Validation(msg) => AppError::ValidationError(msg),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service
        .list_appointments()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .book_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "appointment": appointment })),
    ))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    service
        .cancel_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "ok": true })))
}
