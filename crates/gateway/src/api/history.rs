use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use sm_accounts::HistoryEntry;

use crate::state::AppState;

use super::api_error;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub username: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/history?username=
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Entries in insertion order; `[]` for unknown users or no `username`.
pub async fn history(State(state): State<AppState>, Query(q): Query<HistoryQuery>) -> Response {
    let Some(username) = q.username else {
        return Json(Vec::<HistoryEntry>::new()).into_response();
    };
    match state.history.list(&username).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            tracing::error!(username = %username, error = %e, "history lookup failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}
