//! HTTP front end for a human-vs-engine chess session.
//!
//! The server holds a single [`SharedSession`] and exposes it as a small JSON
//! API. See [`router`] for the routes.

pub mod api;
pub mod config;
pub mod middleware;

use axum::routing::{get, post};
use axum::Router;
use config::ServerConfig;
use sparring_core::{OracleAdapter, Session, SharedSession, UciOracle};
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        AppState {
            session: SharedSession::new(session),
        }
    }
}

/// Builds the session described by `config`.
///
/// With the engine enabled it is started here so a missing binary shows up
/// in the startup log; the session still works without replies if it fails.
/// This blocks on the engine handshake.
pub fn build_session(config: &ServerConfig) -> Session {
    let oracle = if config.engine.enabled {
        let mut oracle = UciOracle::new(config.engine.oracle_config());
        if let Err(e) = oracle.warm_up() {
            tracing::warn!(
                engine = %config.engine.path,
                error = %e,
                "Engine unavailable; will retry on the first move"
            );
        }
        OracleAdapter::new(oracle)
    } else {
        tracing::info!("Engine disabled; moves will not be answered");
        OracleAdapter::none()
    };
    Session::new(oracle, config.default_tier)
}

/// All routes, with request timing and permissive CORS.
///
/// | Route | Handler |
/// |-------|---------|
/// | `GET /health` | [`api::health`] |
/// | `GET /api/state`, `GET /get_fen` | [`api::state`] |
/// | `POST /api/reset` | [`api::reset`] |
/// | `POST /api/difficulty`, `POST /set_difficulty` | [`api::set_difficulty`] |
/// | `POST /api/move`, `POST /move` | [`api::make_move`] |
/// | `POST /api/undo` | [`api::undo`] |
/// | `POST /api/redo` | [`api::redo`] |
/// | `GET /api/history` | [`api::history`] |
/// | `GET /api/pgn` | [`api::pgn`] |
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/state", get(api::state))
        .route("/get_fen", get(api::state))
        .route("/api/reset", post(api::reset))
        .route("/api/difficulty", post(api::set_difficulty))
        .route("/set_difficulty", post(api::set_difficulty))
        .route("/api/move", post(api::make_move))
        .route("/move", post(api::make_move))
        .route("/api/undo", post(api::undo))
        .route("/api/redo", post(api::redo))
        .route("/api/history", get(api::history))
        .route("/api/pgn", get(api::pgn))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::timing_layer))
        .layer(cors)
}
