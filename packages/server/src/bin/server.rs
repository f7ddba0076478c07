//! Utage room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin utage-server
//! cargo run --bin utage-server -- --host 0.0.0.0 --port 3000 --tick-ms 500
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use utage_server::{
    config::{ServerConfig, TimingConfig},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};
use utage_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "utage-server")]
#[command(about = "Room presence and broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "UTAGE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "UTAGE_PORT", default_value = "8080")]
    port: u16,

    /// Interval between subscription deliveries, in milliseconds
    #[arg(long, env = "UTAGE_TICK_MS", default_value = "1000")]
    tick_ms: u64,

    /// Interval between liveness sweeps, in seconds
    #[arg(long, env = "UTAGE_SWEEP_SECS", default_value = "5")]
    sweep_secs: u64,

    /// Silence after which a connection in a room is evicted, in seconds
    #[arg(long, env = "UTAGE_HEARTBEAT_TIMEOUT_SECS", default_value = "10")]
    heartbeat_timeout_secs: u64,

    /// Log level for the server's own targets
    #[arg(long, env = "UTAGE_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            timing: TimingConfig {
                tick_interval: Duration::from_millis(args.tick_ms),
                sweep_interval: Duration::from_secs(args.sweep_secs),
                heartbeat_timeout: Duration::from_secs(args.heartbeat_timeout_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    if let Err(e) = config.timing.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Binding {} with {:?}", config.bind_addr(), config.timing);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. AppState (use cases, scheduler, liveness)
    // 4. Server
    let repository = Arc::new(InMemoryRoomRepository::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let state = AppState::new(repository, message_pusher, &config.timing);

    let server = Server::new(state);
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
