// src/handlers/history.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{models::history::HistoryResponse, state::AppState};

/// Returns the bank ids already shown on this device.
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    let history = state.history.lock().await;
    let seen_ids: Vec<i64> = history.seen().iter().copied().collect();

    Json(HistoryResponse {
        seen_count: seen_ids.len(),
        seen_ids,
    })
}

/// Forgets the seen history so every question counts as unseen again.
pub async fn reset_history(State(state): State<AppState>) -> impl IntoResponse {
    state.history.lock().await.reset().await;
    tracing::info!("Seen question history reset");
    StatusCode::NO_CONTENT
}
