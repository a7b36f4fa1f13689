//! Bot configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name used in replies and on the dashboard
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Directory holding the gateway's multi-file auth state
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// WebSocket URL of the protocol gateway
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Timeout for the initial connect, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Reconnect policy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum reconnect attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Backoff delay cap in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Dashboard HTTP port
    #[serde(default = "default_http_port")]
    pub port: u16,
}

// Defaults
fn default_bot_name() -> String { "Casper".to_string() }
fn default_session_dir() -> PathBuf { PathBuf::from("./auth_info") }
fn default_gateway_url() -> String { "ws://127.0.0.1:4500/session".to_string() }
fn default_connect_timeout() -> u64 { 30 }
fn default_max_retries() -> u32 { 10 }
fn default_base_delay() -> u64 { 1000 }
fn default_max_delay() -> u64 { 60_000 }
fn default_http_port() -> u16 { 3000 }

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            session_dir: default_session_dir(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: default_http_port() }
    }
}
