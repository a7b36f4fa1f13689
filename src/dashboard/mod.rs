//! Dashboard - status page and JSON API for the running bot
//!
//! Serves:
//! - the HTML status/pairing page
//! - `/health` for liveness probes
//! - `/api/qr` for the pairing poller
//! - `/api/status` for the full picture

pub mod routes;

use axum::{routing::get, Router};

use crate::state::SharedState;

/// Create the dashboard router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/qr", get(routes::api_qr))
        .route("/api/status", get(routes::api_status))
        .nest_service("/static", tower_http::services::ServeDir::new("static"))
        .with_state(state)
}
