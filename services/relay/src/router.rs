use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use formgate_core::health::{healthz, readyz};
use formgate_core::middleware::request_id_layer;

use crate::handlers::{submit_form::submit_form, verify_email::verify_email};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Verification gate
        .route("/verify-email", post(verify_email))
        .route("/submit-form", get(submit_form))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
