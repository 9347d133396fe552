use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::runtime::{process_request, ProcessInput};
use crate::state::AppState;

use super::api_error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/process
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Success body is the formatted answer as a bare JSON string. An
/// unreadable body gets the same fixed 500 as a pipeline failure.
pub async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessInput>, JsonRejection>,
) -> Response {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected /api/process body");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };

    match process_request(&state, input).await {
        Ok(formatted) => Json(formatted).into_response(),
        // Detail was already logged by the pipeline.
        Err(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request"),
    }
}
