use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route(
            "/appointments/{appointment_id}",
            delete(handlers::cancel_appointment),
        )
        .with_state(state)
}
