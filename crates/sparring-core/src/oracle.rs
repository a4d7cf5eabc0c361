//! Move-suggestion oracle.
//!
//! An [`Oracle`] is anything that can propose a move for a FEN position under
//! a strength profile and a time budget. The session talks to it through an
//! [`OracleAdapter`], which owns the oracle, skips redundant strength updates
//! and turns every call into a typed result the session can match on.

use crate::difficulty::EngineProfile;
use crate::Move;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Engine error: {0}")]
    Engine(#[from] uci::UciError),
    #[error("Engine suggested an unreadable move: '{0}'")]
    BadMove(String),
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}

/// A source of computer replies.
pub trait Oracle: Send {
    /// Display name, used as the opponent's name in exported games.
    fn name(&self) -> String;

    /// Signals that the next position belongs to a fresh game.
    fn new_game(&mut self) -> Result<(), OracleError>;

    /// Configures playing strength.
    fn set_strength(&mut self, profile: &EngineProfile) -> Result<(), OracleError>;

    /// Sets the position to search from.
    fn set_position(&mut self, fen: &str) -> Result<(), OracleError>;

    /// Searches for at most `budget` and returns the best move found.
    ///
    /// `Ok(None)` means the oracle has nothing to offer.
    fn best_move_within(&mut self, budget: Duration) -> Result<Option<Move>, OracleError>;
}

/// Oracle used when no engine is configured. Never replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOracle;

impl Oracle for NoOracle {
    fn name(&self) -> String {
        "No engine".to_string()
    }

    fn new_game(&mut self) -> Result<(), OracleError> {
        Ok(())
    }

    fn set_strength(&mut self, _profile: &EngineProfile) -> Result<(), OracleError> {
        Ok(())
    }

    fn set_position(&mut self, _fen: &str) -> Result<(), OracleError> {
        Ok(())
    }

    fn best_move_within(&mut self, _budget: Duration) -> Result<Option<Move>, OracleError> {
        Ok(None)
    }
}

/// Session-facing wrapper around an [`Oracle`].
///
/// The oracle sits behind a mutex so that the adapter, and the session owning
/// it, stay `Sync` even when the oracle holds thread-bound handles such as a
/// channel receiver. Mutating calls go through `get_mut` and never block.
pub struct OracleAdapter {
    oracle: Mutex<Box<dyn Oracle>>,
    /// Strength last sent successfully; `None` forces a resend.
    configured: Option<EngineProfile>,
}

impl OracleAdapter {
    pub fn new(oracle: impl Oracle + 'static) -> Self {
        Self::from_boxed(Box::new(oracle))
    }

    pub fn from_boxed(oracle: Box<dyn Oracle>) -> Self {
        OracleAdapter {
            oracle: Mutex::new(oracle),
            configured: None,
        }
    }

    /// An adapter that never suggests anything.
    pub fn none() -> Self {
        Self::new(NoOracle)
    }

    pub fn name(&self) -> String {
        self.oracle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .name()
    }

    /// Asks for a reply to `fen` under `profile`, bounded by its think time.
    pub fn suggest(
        &mut self,
        fen: &str,
        profile: &EngineProfile,
    ) -> Result<Option<Move>, OracleError> {
        let oracle = self.oracle.get_mut().unwrap_or_else(PoisonError::into_inner);
        let result = ask(&mut **oracle, &mut self.configured, fen, profile);
        if result.is_err() {
            self.configured = None;
        }
        result
    }

    /// Tells the oracle a new game started. Failures are logged, not returned.
    pub fn new_game(&mut self) {
        let oracle = self.oracle.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = oracle.new_game() {
            tracing::warn!(error = %e, "Oracle failed to start a new game");
            self.configured = None;
        }
    }
}

fn ask(
    oracle: &mut dyn Oracle,
    configured: &mut Option<EngineProfile>,
    fen: &str,
    profile: &EngineProfile,
) -> Result<Option<Move>, OracleError> {
    if *configured != Some(*profile) {
        oracle.set_strength(profile)?;
        *configured = Some(*profile);
    }
    oracle.set_position(fen)?;
    oracle.best_move_within(Duration::from_millis(profile.think_time_ms))
}

impl std::fmt::Debug for OracleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("name", &self.name())
            .field("configured", &self.configured)
            .finish()
    }
}
