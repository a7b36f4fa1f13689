//! casper-bot: command-responding chat bot with a status dashboard
//!
//! The bot runs against an external messaging gateway that owns the actual
//! protocol. This process provides:
//! - Connection supervision (reconnect with backoff, QR pairing, logout
//!   handling)
//! - A fixed command set with canned replies
//! - A web dashboard with status, pairing QR and health endpoints

mod client;
mod commands;
mod config;
mod connection;
mod dashboard;
mod qr;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use config::Config;
use connection::Supervisor;
use dashboard::create_router;
use state::BotState;

#[derive(Parser)]
#[command(name = "casper-bot")]
#[command(about = "Command-responding chat bot with a QR pairing status dashboard")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "casper.toml")]
    config: String,

    /// Dashboard HTTP port (overrides config file)
    #[arg(short, long, env = "CASPER_PORT")]
    port: Option<u16>,

    /// Session directory (overrides config file)
    #[arg(long, env = "CASPER_SESSION_DIR")]
    session_dir: Option<String>,

    /// Gateway WebSocket URL (overrides config file)
    #[arg(long, env = "CASPER_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Bot display name (overrides config file)
    #[arg(long, env = "CASPER_BOT_NAME")]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casper_bot=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting casper-bot");
    info!("Config file: {}", cli.config);

    // Load or create default config
    let mut config: Config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.http.port = port;
    }
    if let Some(session_dir) = cli.session_dir {
        config.bot.session_dir = PathBuf::from(session_dir);
    }
    if let Some(gateway_url) = cli.gateway_url {
        config.gateway.url = gateway_url;
    }
    if let Some(name) = cli.name {
        config.bot.name = name;
    }

    info!("Bot name: {}", config.bot.name);
    info!("Gateway: {}", config.gateway.url);
    info!("Session dir: {}", config.bot.session_dir.display());

    // Shared state between the supervisor and the dashboard
    let state = BotState::shared(config.clone());

    // Start the connection supervisor in the background
    let supervisor = Supervisor::new(config.clone(), state.clone())?;
    tokio::spawn(supervisor.run());

    // Serve the dashboard
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    info!("Dashboard listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received Ctrl-C, shutting down");
}
