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

use crate::models::{CreateItemRequest, InventoryError, UpdateItemRequest};
use crate::services::InventoryService;

fn map_inventory_error(e: InventoryError) -> AppError {
    match e {
        InventoryError::NotFound => AppError::NotFound("Inventory item not found".to_string()),
        InventoryError::Validation(msg) => AppError::ValidationError(msg),
        InventoryError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_items(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = InventoryService::new(&state);
    let items = service.list_items().await.map_err(map_inventory_error)?;

    Ok(Json(json!(items)))
}

#[axum::debug_handler]
pub async fn create_item(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = InventoryService::new(&state);
    let item = service
        .create_item(request)
        .await
        .map_err(map_inventory_error)?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "item": item }))))
}

#[axum::debug_handler]
pub async fn update_item(
    State(state): State<Arc<AppConfig>>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InventoryService::new(&state);
    let item = service
        .update_item(item_id, request)
        .await
        .map_err(map_inventory_error)?;

    Ok(Json(json!({ "ok": true, "item": item })))
}

#[axum::debug_handler]
pub async fn delete_item(
    State(state): State<Arc<AppConfig>>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InventoryService::new(&state);
    service
        .delete_item(item_id)
        .await
        .map_err(map_inventory_error)?;

    Ok(Json(json!({ "ok": true })))
}

#[axum::debug_handler]
pub async fn low_stock_alerts(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = InventoryService::new(&state);
    let alerts = service
        .low_stock_alerts()
        .await
        .map_err(map_inventory_error)?;
    let count = alerts.len();

    Ok(Json(json!({ "alerts": alerts, "count": count })))
}
