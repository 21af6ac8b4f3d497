use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn inventory_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/inventory", get(handlers::list_items).post(handlers::create_item))
        .route("/inventory/alerts", get(handlers::low_stock_alerts))
        .route(
            "/inventory/{item_id}",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .with_state(state)
}
