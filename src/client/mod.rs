//! Gateway protocol client
//!
//! The messaging protocol itself (handshake, encryption, session format)
//! lives in an external gateway process. This module owns the typed frame
//! vocabulary spoken over its WebSocket and the session plumbing around it:
//!
//! - [`GatewayEvent`]: decoded frames from the gateway (`connection.update`,
//!   `messages.upsert`, `creds.update`)
//! - [`ClientCommand`]: frames we send (`init`, `send.message`)
//! - [`gateway::GatewaySession`]: the live connection

pub mod auth;
pub mod gateway;

use serde::{Deserialize, Serialize};

pub use auth::{AuthFile, AuthState};
pub use gateway::{GatewaySession, SessionEvent, SessionSender};

/// Gateway status codes carried on a close update
pub mod disconnect_reason {
    /// Session was unlinked from the phone; reconnecting is pointless
    pub const LOGGED_OUT: u16 = 401;
}

/// A frame received from the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GatewayEvent {
    #[serde(rename = "connection.update")]
    ConnectionUpdate(ConnectionUpdate),

    #[serde(rename = "messages.upsert")]
    MessagesUpsert { messages: Vec<IncomingMessage> },

    /// Updated auth material to persist into the session directory
    #[serde(rename = "creds.update")]
    CredsUpdate {
        file: String,
        contents: serde_json::Value,
    },
}

/// Connection lifecycle update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    /// "connecting", "open" or "close"; absent for QR-only updates
    #[serde(default)]
    pub connection: Option<ConnectionPhase>,

    /// Pairing payload to render as a QR code
    #[serde(default)]
    pub qr: Option<String>,

    /// Status code explaining a close
    #[serde(default)]
    pub status_code: Option<u16>,

    /// Human-readable error accompanying a close
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPhase {
    Connecting,
    Open,
    Close,
}

impl ConnectionUpdate {
    /// True when the close is a logout rather than a transient drop
    pub fn is_logged_out(&self) -> bool {
        self.status_code == Some(disconnect_reason::LOGGED_OUT)
    }
}

/// A message delivered by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: String,

    /// Chat JID the message belongs to (reply target)
    pub chat: String,

    /// Push name of the sender, when the gateway knows it
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Plain text body; media messages arrive without one
    #[serde(default)]
    pub text: Option<String>,

    /// Set for our own outgoing messages echoed back
    #[serde(default)]
    pub from_me: bool,
}

impl IncomingMessage {
    /// Group chats use the `@g.us` JID suffix
    pub fn is_group(&self) -> bool {
        self.chat.ends_with("@g.us")
    }

    pub fn sender_name(&self) -> &str {
        self.sender_name.as_deref().unwrap_or("Unknown")
    }
}

/// A frame sent to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// First frame after connect: identifies the bot and replays stored
    /// auth state so the gateway can resume the session
    #[serde(rename = "init")]
    Init {
        browser: BrowserIdent,
        creds: Vec<AuthFile>,
    },

    #[serde(rename = "send.message")]
    SendMessage { id: String, to: String, text: String },
}

/// Client identification shown on the paired phone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserIdent {
    pub name: String,
    pub platform: String,
    pub version: String,
}

impl BrowserIdent {
    pub fn new(bot_name: &str) -> Self {
        Self {
            name: bot_name.to_string(),
            platform: "Chrome".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
