use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route("/patients/{patient_id}", delete(handlers::delete_patient))
        .with_state(state)
}
