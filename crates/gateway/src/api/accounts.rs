use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use sm_domain::error::Error;

use crate::state::AppState;

use super::api_message;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn success() -> Response {
    Json(serde_json::json!({ "success": true })).into_response()
}

/// Unwrap the body or answer with the generic server error.
fn credentials(
    route: &'static str,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Credentials, Response> {
    body.map(|Json(c)| c).map_err(|rejection| {
        tracing::warn!(route, error = %rejection, "rejected credentials body");
        api_message(StatusCode::INTERNAL_SERVER_ERROR, "server error")
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/register
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let body = match credentials("/api/register", body) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.accounts.register(&body.username, &body.password).await {
        Ok(()) => success(),
        Err(Error::DuplicateUsername(_)) => {
            api_message(StatusCode::BAD_REQUEST, "username exists")
        }
        Err(Error::MissingField(_)) => api_message(
            StatusCode::BAD_REQUEST,
            "username and password are required",
        ),
        Err(e) => {
            tracing::error!(username = %body.username, error = %e, "registration failed");
            api_message(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/login
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let body = match credentials("/api/login", body) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.accounts.login(&body.username, &body.password).await {
        Ok(()) => success(),
        Err(Error::InvalidCredentials) => {
            api_message(StatusCode::UNAUTHORIZED, "invalid credentials")
        }
        Err(e) => {
            tracing::error!(username = %body.username, error = %e, "login failed");
            api_message(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}
