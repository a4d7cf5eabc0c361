//! Route handlers.
//!
//! Every handler runs its session call on the blocking pool: a move request
//! holds the session's write lock through the engine search.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sparring_core::{DifficultyTier, GameHistory, SessionError, SharedSession, StatusSnapshot};
use thiserror::Error;

use crate::AppState;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(e) => match e {
                SessionError::Validation(_)
                | SessionError::InvalidTier(_)
                | SessionError::InvalidPosition(_) => StatusCode::BAD_REQUEST,
                SessionError::IllegalMove(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SessionError::CorruptHistory(_) | SessionError::Poisoned => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Session(e) => e.kind(),
            ApiError::BadRequest(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Runs a session call off the async runtime.
async fn with_session<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SharedSession) -> Result<T, SessionError> + Send + 'static,
{
    let session = state.session.clone();
    tokio::task::spawn_blocking(move || f(&session))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Body of a move request: either squares or a UCI string.
#[derive(Debug, Default, Deserialize)]
pub struct MoveRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub promotion: Option<String>,
    #[serde(rename = "move")]
    pub uci: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DifficultyRequest {
    #[serde(alias = "state")]
    pub tier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DifficultyResponse {
    pub ok: bool,
    pub tier: DifficultyTier,
    pub status: StatusSnapshot,
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /api/state`
pub async fn state(State(state): State<AppState>) -> Result<Json<StatusSnapshot>, ApiError> {
    with_session(&state, |s| s.status()).await.map(Json)
}

/// `POST /api/reset`
pub async fn reset(State(state): State<AppState>) -> Result<Json<StatusSnapshot>, ApiError> {
    with_session(&state, |s| s.restart()).await.map(Json)
}

/// `POST /api/difficulty`
///
/// Responds `400` with `invalid_tier` for an unknown or missing name.
pub async fn set_difficulty(
    State(state): State<AppState>,
    payload: Result<Json<DifficultyRequest>, JsonRejection>,
) -> Result<Json<DifficultyResponse>, ApiError> {
    let Json(request) = payload?;
    let name = request.tier.unwrap_or_default();
    let status = with_session(&state, move |s| s.set_difficulty(&name)).await?;
    Ok(Json(DifficultyResponse {
        ok: true,
        tier: status.tier,
        status,
    }))
}

/// `POST /api/move`
///
/// Accepts `{"from", "to", "promotion"?}` or `{"move": "e2e4"}`. Malformed
/// input is `400 validation`; a move the position does not allow is
/// `422 illegal_move`.
pub async fn make_move(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let Json(request) = payload?;
    let status = match request {
        MoveRequest { uci: Some(uci), .. } => {
            with_session(&state, move |s| s.apply_human_uci(&uci)).await?
        }
        MoveRequest {
            from: Some(from),
            to: Some(to),
            promotion,
            ..
        } => {
            with_session(&state, move |s| {
                s.apply_human_move(&from, &to, promotion.as_deref())
            })
            .await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Expected {\"from\", \"to\"} or {\"move\"}".to_string(),
            ))
        }
    };
    Ok(Json(status))
}

/// `POST /api/undo`
pub async fn undo(State(state): State<AppState>) -> Result<Json<StatusSnapshot>, ApiError> {
    with_session(&state, |s| s.undo()).await.map(Json)
}

/// `POST /api/redo`
pub async fn redo(State(state): State<AppState>) -> Result<Json<StatusSnapshot>, ApiError> {
    with_session(&state, |s| s.redo()).await.map(Json)
}

/// `GET /api/history`
pub async fn history(State(state): State<AppState>) -> Result<Json<GameHistory>, ApiError> {
    with_session(&state, |s| s.history()).await.map(Json)
}

/// `GET /api/pgn`
pub async fn pgn(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pgn = with_session(&state, |s| s.export_pgn()).await?;
    Ok(([(header::CONTENT_TYPE, "application/x-chess-pgn")], pgn))
}
