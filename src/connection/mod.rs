//! Connection supervisor
//!
//! Owns the session lifecycle: connect to the gateway, drive its events
//! into state changes and command replies, and decide what a close means.
//! Transient drops reconnect under the [`retry::RetryPolicy`]; a logout
//! clears the stored session and starts a fresh pairing.

pub mod retry;

use tracing::{debug, error, info, warn};

use crate::client::{
    AuthState, BrowserIdent, ClientCommand, ConnectionPhase, GatewayEvent, GatewaySession,
    IncomingMessage, SessionEvent, SessionSender,
};
use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::qr::QrImage;
use crate::state::SharedState;

use retry::RetryPolicy;

/// Why a session ended
enum SessionOutcome {
    /// Transient drop; worth reconnecting
    Retryable(Option<String>),
    /// Gateway invalidated the session
    LoggedOut,
}

pub struct Supervisor {
    config: Config,
    state: SharedState,
    auth: AuthState,
    dispatcher: CommandDispatcher,
    retry: RetryPolicy,
}

impl Supervisor {
    pub fn new(config: Config, state: SharedState) -> anyhow::Result<Self> {
        let auth = AuthState::open(&config.bot.session_dir)?;
        let dispatcher = CommandDispatcher::new(&config.bot.name);
        let retry = RetryPolicy::new(config.retry.clone());
        Ok(Self {
            config,
            state,
            auth,
            dispatcher,
            retry,
        })
    }

    /// Run until the retry budget is exhausted
    pub async fn run(mut self) {
        loop {
            self.state.write().await.on_connecting();

            if self.auth.has_credentials() {
                info!("Resuming stored session");
            } else {
                info!("No stored session, pairing required");
            }

            let outcome = match self.connect().await {
                Ok(session) => self.drive(session).await,
                Err(e) => {
                    warn!(error = %e, "Gateway connect failed");
                    SessionOutcome::Retryable(Some(e.to_string()))
                }
            };

            match outcome {
                SessionOutcome::LoggedOut => {
                    match self.auth.clear() {
                        Ok(count) => {
                            info!(files = count, "Logged out, cleared stored session")
                        }
                        Err(e) => warn!(error = %e, "Failed to clear session dir"),
                    }
                    self.state.write().await.on_logged_out();
                    // The old session's failures don't count against the
                    // fresh pairing
                    self.retry.reset();
                }
                SessionOutcome::Retryable(error) => {
                    if let Some(err) = &error {
                        warn!(error = %err, "Connection closed");
                    } else {
                        warn!("Connection closed");
                    }

                    match self.retry.next_delay() {
                        Some(delay) => {
                            self.state
                                .write()
                                .await
                                .on_disconnected(self.retry.attempt(), error);
                            info!(
                                attempt = self.retry.attempt(),
                                delay_ms = delay.as_millis() as u64,
                                "Reconnecting after backoff"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            let msg = error.unwrap_or_else(|| "connection lost".to_string());
                            error!(
                                attempts = self.retry.attempt(),
                                "Retry budget exhausted, giving up"
                            );
                            self.state.write().await.on_error(msg);
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn connect(&self) -> anyhow::Result<GatewaySession> {
        let creds = self.auth.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load stored session, pairing from scratch");
            Vec::new()
        });
        let init = ClientCommand::Init {
            browser: BrowserIdent::new(&self.config.bot.name),
            creds,
        };
        Ok(GatewaySession::connect(&self.config.gateway, init).await?)
    }

    /// Pump one session until it closes
    async fn drive(&mut self, mut session: GatewaySession) -> SessionOutcome {
        let sender = session.sender();

        while let Some(event) = session.next_event().await {
            match event {
                SessionEvent::Event(GatewayEvent::ConnectionUpdate(update)) => {
                    if let Some(payload) = &update.qr {
                        self.handle_qr(payload).await;
                    }

                    match update.connection {
                        Some(ConnectionPhase::Open) => {
                            self.retry.reset();
                            self.state.write().await.on_connected();
                            info!(bot = %self.config.bot.name, "Connected, bot is online");
                        }
                        Some(ConnectionPhase::Close) => {
                            if update.is_logged_out() {
                                return SessionOutcome::LoggedOut;
                            }
                            return SessionOutcome::Retryable(update.error);
                        }
                        Some(ConnectionPhase::Connecting) | None => {
                            debug!("Gateway handshake in progress");
                        }
                    }
                }

                SessionEvent::Event(GatewayEvent::MessagesUpsert { messages }) => {
                    for message in messages {
                        self.handle_message(&message, &sender).await;
                    }
                }

                SessionEvent::Event(GatewayEvent::CredsUpdate { file, contents }) => {
                    if let Err(e) = self.auth.store(&file, &contents) {
                        warn!(error = %e, "Failed to persist credential update");
                    }
                }

                SessionEvent::Closed { error } => {
                    return SessionOutcome::Retryable(error);
                }
            }
        }

        SessionOutcome::Retryable(None)
    }

    async fn handle_qr(&self, payload: &str) {
        match QrImage::render(payload) {
            Ok(qr) => {
                info!("Scan this QR code with your phone:\n{}", qr.terminal);
                info!("Open the app, go to Linked Devices, then Link a Device");
                self.state.write().await.on_qr(qr);
            }
            Err(e) => warn!(error = %e, "Failed to render pairing QR"),
        }
    }

    async fn handle_message(&self, message: &IncomingMessage, sender: &SessionSender) {
        // Own echoes and media-only messages carry nothing to dispatch
        if message.from_me {
            return;
        }
        let Some(text) = message.text.as_deref() else {
            return;
        };
        if text.is_empty() {
            return;
        }

        self.state.write().await.messages_seen += 1;
        info!(
            from = message.sender_name(),
            group = message.is_group(),
            text,
            "Message received"
        );

        let replies = self.dispatcher.dispatch(message.sender_name(), text);
        if replies.is_empty() {
            return;
        }

        for reply in replies {
            if let Err(e) = sender.send_text(&message.chat, &reply).await {
                warn!(error = %e, "Failed to send reply");
                return;
            }
        }
        self.state.write().await.commands_handled += 1;
    }
}
