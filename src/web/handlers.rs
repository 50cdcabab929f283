//! HTTP request handlers.

use super::AppState;

use axum::{extract::State, response::IntoResponse, Json};

/// Latest published record. Never waits on a cycle in flight.
pub async fn handle_get_typhoon(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.coordinator.latest())
}

/// Manual refresh: runs a cycle, or joins the one in flight.
pub async fn handle_refresh(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Manual refresh requested");
    Json(state.coordinator.refresh().await)
}

pub async fn handle_health() -> &'static str {
    "ok"
}
