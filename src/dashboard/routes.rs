//! Dashboard HTTP routes

use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
};
use serde::Serialize;

use crate::commands::CommandDispatcher;
use crate::state::{ConnectionState, SharedState};

/// Status page; polls the JSON endpoints from the browser
pub async fn index() -> impl IntoResponse {
    Html(include_str!("../../static/dashboard.html"))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bot: String,
    pub connection: ConnectionState,
    pub timestamp: String,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;

    Json(HealthResponse {
        status: "healthy",
        bot: state.config.bot.name.clone(),
        connection: state.connection,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Pairing poll response
#[derive(Serialize)]
pub struct QrResponse {
    /// SVG markup of the pending pairing code, or null
    pub qr: Option<String>,
    pub status: ConnectionState,
    pub retry: u32,
}

/// GET /api/qr
pub async fn api_qr(State(state): State<SharedState>) -> Json<QrResponse> {
    let state = state.read().await;

    Json(QrResponse {
        qr: state.latest_qr.as_ref().map(|qr| qr.svg.clone()),
        status: state.connection,
        retry: state.retry_count,
    })
}

/// Full bot status
#[derive(Serialize)]
pub struct StatusResponse {
    pub bot: String,
    pub hostname: String,
    pub connection: ConnectionState,
    pub retry_count: u32,
    pub uptime_secs: u64,
    pub messages_seen: u64,
    pub commands_handled: u64,
    pub last_error: Option<String>,
    pub version: String,
    pub commands: Vec<CommandInfo>,
}

#[derive(Serialize)]
pub struct CommandInfo {
    pub command: &'static str,
    pub description: &'static str,
}

/// GET /api/status
pub async fn api_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let state = state.read().await;

    let commands = CommandDispatcher::command_list()
        .iter()
        .map(|&(command, description)| CommandInfo {
            command,
            description,
        })
        .collect();

    Json(StatusResponse {
        bot: state.config.bot.name.clone(),
        hostname: hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
        connection: state.connection,
        retry_count: state.retry_count,
        uptime_secs: state.uptime_secs(),
        messages_seen: state.messages_seen,
        commands_handled: state.commands_handled,
        last_error: state.last_error.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commands,
    })
}
