pub mod accounts;
pub mod history;
pub mod process;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;

use sm_domain::config::ServerConfig;

use crate::state::AppState;

/// Build the full router: JSON API, the `/` redirect, and static files
/// from `server.static_dir` for everything else.
pub fn router(server: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/process", post(process::process))
        .route("/api/register", post(accounts::register))
        .route("/api/login", post(accounts::login))
        .route("/api/history", get(history::history))
        .fallback_service(ServeDir::new(&server.static_dir))
}

async fn index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config.server.index_page)
}

/// `{"error": message}` with the given status.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// `{"message": message}` with the given status (account endpoints).
pub(crate) fn api_message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "message": message.into() }))).into_response()
}
