use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/get_slots/{doctor_id}/{date}", get(handlers::get_slots))
        .route("/ai/suggest-appointment", post(handlers::suggest_appointment))
        .with_state(state)
}
