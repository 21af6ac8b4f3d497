use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn insights_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/reports/appointments", get(handlers::appointment_report))
        .route("/ai/predict-flow", post(handlers::predict_flow))
        .route("/ai/nlp-query", post(handlers::nlp_query))
        .with_state(state)
}
