use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::{doctor_routes, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Directory API is running!" }))
        .merge(doctor_routes(state))
}
