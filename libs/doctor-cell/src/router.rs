use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route(
            "/doctors/{doctor_id}/working-hours",
            get(handlers::get_working_hours),
        )
        .with_state(state)
}
