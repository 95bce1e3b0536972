use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
};

use crate::handlers;
use crate::state::AppState;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // Admin form endpoints keep the paths the front-end already calls
    let directory_routes = Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/add-doctor", post(handlers::create_doctor))
        .route("/update-doctor/{doctor_id}", put(handlers::update_doctor))
        .route("/delete-doctor/{doctor_id}", delete(handlers::delete_doctor));

    let view_routes = Router::new()
        .route("/locale/{lang}/doctors", get(handlers::get_locale_doctors))
        .route("/calendar/events", get(handlers::get_calendar_events));

    Router::new()
        .merge(directory_routes)
        .merge(view_routes)
        .with_state(state)
}
