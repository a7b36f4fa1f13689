//! Shared bot state
//!
//! The original deployment kept connection status, retry count and the
//! latest QR in module-level globals. Here they live in one `BotState`
//! object shared between the connection supervisor and the dashboard.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::qr::QrImage;

/// Connection lifecycle state, mutated only by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No session and no attempt in flight
    Disconnected,
    /// Dialing the gateway
    Connecting,
    /// Gateway issued a pairing QR, waiting for the phone to scan it
    AwaitingScan,
    /// Session open, messages flowing
    Connected,
    /// Gateway reported a non-retryable logout
    LoggedOut,
    /// Retry budget exhausted or fatal setup failure
    Error,
}

pub type SharedState = Arc<RwLock<BotState>>;

/// Everything the dashboard can observe about the running bot
pub struct BotState {
    pub config: Config,
    pub connection: ConnectionState,
    /// Reconnect attempts since the last successful open
    pub retry_count: u32,
    /// Rendered pairing code; replaced on every QR event, cleared on open
    pub latest_qr: Option<QrImage>,
    /// Message from the most recent disconnect, if any
    pub last_error: Option<String>,
    pub messages_seen: u64,
    pub commands_handled: u64,
    started_at: Instant,
}

impl BotState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connection: ConnectionState::Disconnected,
            retry_count: 0,
            latest_qr: None,
            last_error: None,
            messages_seen: 0,
            commands_handled: 0,
            started_at: Instant::now(),
        }
    }

    pub fn shared(config: Config) -> SharedState {
        Arc::new(RwLock::new(Self::new(config)))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Dialing started (initial connect or reconnect)
    pub fn on_connecting(&mut self) {
        self.connection = ConnectionState::Connecting;
    }

    /// A fresh pairing QR arrived
    pub fn on_qr(&mut self, qr: QrImage) {
        self.latest_qr = Some(qr);
        self.connection = ConnectionState::AwaitingScan;
    }

    /// Session opened
    pub fn on_connected(&mut self) {
        self.connection = ConnectionState::Connected;
        self.retry_count = 0;
        self.latest_qr = None;
        self.last_error = None;
    }

    /// Retryable close; `attempt` is the updated retry counter
    pub fn on_disconnected(&mut self, attempt: u32, error: Option<String>) {
        self.connection = ConnectionState::Disconnected;
        self.retry_count = attempt;
        self.last_error = error;
    }

    /// Gateway invalidated the session
    pub fn on_logged_out(&mut self) {
        self.connection = ConnectionState::LoggedOut;
        self.latest_qr = None;
    }

    /// Supervisor gave up
    pub fn on_error(&mut self, error: String) {
        self.connection = ConnectionState::Error;
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> BotState {
        BotState::new(Config::default())
    }

    #[test]
    fn starts_disconnected() {
        let s = state();
        assert_eq!(s.connection, ConnectionState::Disconnected);
        assert_eq!(s.retry_count, 0);
        assert!(s.latest_qr.is_none());
    }

    #[test]
    fn qr_event_enters_awaiting_scan() {
        let mut s = state();
        s.on_connecting();
        s.on_qr(QrImage::render("pairing-ref-1").unwrap());
        assert_eq!(s.connection, ConnectionState::AwaitingScan);
        assert!(s.latest_qr.is_some());
    }

    #[test]
    fn connect_clears_qr_and_resets_retries() {
        let mut s = state();
        s.on_qr(QrImage::render("pairing-ref-1").unwrap());
        s.on_disconnected(3, Some("stream closed".into()));
        s.on_connected();
        assert_eq!(s.connection, ConnectionState::Connected);
        assert_eq!(s.retry_count, 0);
        assert!(s.latest_qr.is_none());
        assert!(s.last_error.is_none());
    }

    #[test]
    fn new_qr_replaces_old() {
        let mut s = state();
        s.on_qr(QrImage::render("ref-a").unwrap());
        let first = s.latest_qr.as_ref().unwrap().svg.clone();
        s.on_qr(QrImage::render("ref-b").unwrap());
        assert_ne!(first, s.latest_qr.as_ref().unwrap().svg);
    }

    #[test]
    fn logout_drops_qr() {
        let mut s = state();
        s.on_qr(QrImage::render("ref").unwrap());
        s.on_logged_out();
        assert_eq!(s.connection, ConnectionState::LoggedOut);
        assert!(s.latest_qr.is_none());
    }

    #[test]
    fn state_serializes_snake_case() {
        let json = serde_json::to_string(&ConnectionState::AwaitingScan).unwrap();
        assert_eq!(json, "\"awaiting_scan\"");
    }
}
