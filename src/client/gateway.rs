//! Gateway WebSocket session
//!
//! One task owns the socket: it pushes decoded [`GatewayEvent`]s out over a
//! channel and writes queued [`ClientCommand`]s back. A close or transport
//! error surfaces as a terminal [`SessionEvent::Closed`]; deciding whether
//! to reconnect is the supervisor's job, not ours.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::{ClientCommand, GatewayEvent};
use crate::config::GatewayConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CHANNEL_CAPACITY: usize = 256;

/// Something the session loop surfaced to the supervisor
#[derive(Debug)]
pub enum SessionEvent {
    Event(GatewayEvent),
    /// The socket is gone; no further events will arrive
    Closed { error: Option<String> },
}

/// A live connection to the gateway
pub struct GatewaySession {
    events: mpsc::Receiver<SessionEvent>,
    commands: mpsc::Sender<ClientCommand>,
}

/// Cloneable handle for sending outgoing messages
#[derive(Clone)]
pub struct SessionSender {
    commands: mpsc::Sender<ClientCommand>,
}

impl GatewaySession {
    /// Dial the gateway and send the init frame
    pub async fn connect(
        config: &GatewayConfig,
        init: ClientCommand,
    ) -> Result<Self, ClientError> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let (mut ws, _response) = timeout(connect_timeout, connect_async(config.url.as_str()))
            .await
            .map_err(|_| ClientError::ConnectTimeout {
                secs: config.connect_timeout_secs,
            })?
            .map_err(|e| ClientError::Connect(e.to_string()))?;

        debug!(url = %config.url, "Gateway socket open");

        let frame = serde_json::to_string(&init).map_err(ClientError::Encode)?;
        ws.send(Message::Text(frame))
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(session_loop(ws, cmd_rx, event_tx));

        Ok(Self {
            events: event_rx,
            commands: cmd_tx,
        })
    }

    /// Next event from the gateway; `None` after `Closed` has been consumed
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub fn sender(&self) -> SessionSender {
        SessionSender {
            commands: self.commands.clone(),
        }
    }
}

impl SessionSender {
    /// Send a text message to a chat
    pub async fn send_text(&self, to: &str, text: &str) -> Result<(), ClientError> {
        let cmd = ClientCommand::SendMessage {
            id: uuid::Uuid::new_v4().to_string(),
            to: to.to_string(),
            text: text.to_string(),
        };
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ClientError::SessionClosed)
    }
}

/// Owns the socket until it closes
async fn session_loop(
    mut ws: WsStream,
    mut commands: mpsc::Receiver<ClientCommand>,
    events: mpsc::Sender<SessionEvent>,
) {
    let closed = loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(cmd) => {
                    let frame = match serde_json::to_string(&cmd) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Dropping unencodable command");
                            continue;
                        }
                    };
                    if let Err(e) = ws.send(Message::Text(frame)).await {
                        break Some(e.to_string());
                    }
                }
                // All handles dropped; shut the socket down politely
                None => {
                    let _ = ws.close(None).await;
                    break None;
                }
            },

            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<GatewayEvent>(&text) {
                        Ok(event) => {
                            if events.send(SessionEvent::Event(event)).await.is_err() {
                                break None;
                            }
                        }
                        // Unknown frame types are not fatal
                        Err(e) => warn!(error = %e, "Skipping undecodable gateway frame"),
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = ws.send(Message::Pong(payload)).await {
                        break Some(e.to_string());
                    }
                }
                Some(Ok(Message::Close(close))) => {
                    break close.map(|c| c.reason.to_string());
                }
                Some(Ok(_)) => {} // binary/pong frames ignored
                Some(Err(e)) => break Some(e.to_string()),
                None => break None,
            },
        }
    };

    let _ = events.send(SessionEvent::Closed { error: closed }).await;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Gateway connect timed out after {secs}s")]
    ConnectTimeout { secs: u64 },

    #[error("Gateway connect failed: {0}")]
    Connect(String),

    #[error("Gateway session closed")]
    SessionClosed,

    #[error("Failed to encode frame: {0}")]
    Encode(serde_json::Error),
}
