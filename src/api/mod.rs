//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.
//! It is the view layer of the gates: it forwards user commands and returns
//! the resulting gate state.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/gates/pointer", post(create_pointer_gate_handler))
        .route("/gates/booking", post(create_booking_gate_handler))
        .route("/gates/:id", get(gate_status_handler).delete(delete_gate_handler))
        .route("/gates/:id/pointer-move", post(pointer_move_handler))
        .route("/gates/:id/pointer-leave", post(pointer_leave_handler))
        .route("/gates/:id/open", post(open_handler))
        .route("/gates/:id/close", post(close_handler))
        .route("/gates/:id/proceed", post(proceed_handler))
        .route("/gates/:id/redirect-now", post(redirect_now_handler))
        .route("/gates/:id/parent-busy", put(parent_busy_handler))
        .route("/contact", post(contact_handler))
        .route("/inbox", get(inbox_handler))
        .route("/navigations", get(navigations_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
