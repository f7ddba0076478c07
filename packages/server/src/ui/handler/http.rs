//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms, oldest first
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(room))),
        Err(e) => {
            tracing::debug!("Room detail lookup failed: {}", e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
