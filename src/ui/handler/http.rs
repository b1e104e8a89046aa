//! HTTP API handlers for observing registry state.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::{Room, RoomId};
use crate::infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint dumping the raw registry state (for testing purposes)
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<Room>> {
    Json(state.registry.list_rooms().await)
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.registry.list_rooms().await;
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    let shared = state
        .registry
        .get_room(&room_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let room = shared.lock().await;
    Ok(Json(RoomDetailDto::from(&*room)))
}
