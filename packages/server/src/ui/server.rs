//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room presence server: websocket endpoint plus a small HTTP API.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(repository, message_pusher, &config.timing);
/// Server::new(state).run(&config.host, config.port).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket endpoint
            .route("/ws", get(websocket_handler))
            // HTTP endpoints
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the server stops abnormally.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind((host, port)).await?;
        tracing::info!("Connect to: ws://{}:{}/ws", host, port);
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve_with_shutdown(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The liveness sweep runs for exactly as long as the server does.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Utage server listening on {}", listener.local_addr()?);
        let sweep = self.state.liveness_monitor.clone().spawn();

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        sweep.abort();
        self.state.scheduler.shutdown().await;
        tracing::info!("Server shutdown complete");
        result
    }
}
