use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{FlowPrediction, InsightsError, NlpQueryRequest, PredictFlowRequest, ReportSummary};
use crate::services::{FlowService, NlpService, ReportService};

fn map_insights_error(e: InsightsError) -> AppError {
    match e {
        InsightsError::Database(msg) => AppError::Database(msg),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {}", raw)))
}

#[axum::debug_handler]
pub async fn appointment_report(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<ReportSummary>, AppError> {
    let service = ReportService::new(&state);
    let summary = service
        .appointment_report()
        .await
        .map_err(map_insights_error)?;

    Ok(Json(summary))
}

/// Missing date defaults to today.
#[axum::debug_handler]
pub async fn predict_flow(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<PredictFlowRequest>,
) -> Result<Json<FlowPrediction>, AppError> {
    let date = match request.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let service = FlowService::new(&state);
    let prediction = service
        .predict_for_date(date)
        .await
        .map_err(map_insights_error)?;

    Ok(Json(prediction))
}

#[axum::debug_handler]
pub async fn nlp_query(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<NlpQueryRequest>,
) -> Result<Json<Value>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }

    let service = NlpService::new(&state);
    let answer = service
        .answer(&request.query, Utc::now().date_naive())
        .await
        .map_err(map_insights_error)?;

    Ok(Json(answer))
}
