use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use insights_cell::router::insights_routes;
use inventory_cell::router::inventory_routes;
use patient_cell::router::patient_routes;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

/// Every cell hangs its routes under `/api`; the cells share one flat
/// namespace, so their routers are merged before the single nest.
pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .merge(doctor_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .merge(scheduling_routes(state.clone()))
        .merge(insights_routes(state.clone()))
        .merge(inventory_routes(state));

    Router::new()
        .route("/", get(|| async { "MediTrack API is running!" }))
        .nest("/api", api)
}
