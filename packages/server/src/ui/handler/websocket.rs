//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, Outbound},
    infrastructure::dto::websocket::{ErrorCode, ErrorMessage},
    ui::state::AppState,
    usecase::notify::report_error,
};

use super::event::dispatch;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Forwards frames queued for this connection to its socket.
///
/// Stops after an [`Outbound::Close`], when the queue is dropped, or when the
/// socket refuses a write.
fn pusher_loop(
    connection_id: ConnectionId,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if let Err(e) = sender.send(Message::Text(text.into())).await {
                        tracing::debug!("Write to '{}' failed: {}", connection_id, e);
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    state.message_pusher.register_client(connection_id, tx).await;
    tracing::info!("Connection '{}' opened", connection_id);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    report_error(
                        state_clone.message_pusher.as_ref(),
                        &connection_id,
                        ErrorMessage {
                            code: ErrorCode::Validation,
                            message: "binary frames are not supported".to_string(),
                        },
                    )
                    .await;
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection_id);
                    break;
                }
                // Ping/pong is answered by the websocket layer
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    let mut send_task = pusher_loop(connection_id, rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let departures = state.disconnect_usecase.execute(&connection_id).await;
    tracing::info!(
        "Connection '{}' closed ({} room departure(s))",
        connection_id,
        departures.len()
    );
}
