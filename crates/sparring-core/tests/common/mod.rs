//! Oracles with predictable behavior for session tests.

#![allow(dead_code)]

use sparring_core::rules::{Position, RulesEngine, StandardRules};
use sparring_core::{DifficultyTier, EngineProfile, Move, Oracle, OracleAdapter, OracleError, Session};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything an oracle was asked to do.
#[derive(Debug, Default)]
pub struct OracleCalls {
    pub new_games: usize,
    pub strengths: Vec<EngineProfile>,
    pub positions: Vec<String>,
    pub budgets: Vec<Duration>,
}

pub type Calls = Arc<Mutex<OracleCalls>>;

/// Replies from a fixed script, then stays silent.
pub struct ScriptedOracle {
    replies: VecDeque<&'static str>,
    calls: Calls,
}

impl ScriptedOracle {
    pub fn new(replies: &[&'static str]) -> (Self, Calls) {
        let calls = Calls::default();
        let oracle = ScriptedOracle {
            replies: replies.iter().copied().collect(),
            calls: calls.clone(),
        };
        (oracle, calls)
    }
}

impl Oracle for ScriptedOracle {
    fn name(&self) -> String {
        "Scripted".to_string()
    }

    fn new_game(&mut self) -> Result<(), OracleError> {
        self.calls.lock().unwrap().new_games += 1;
        Ok(())
    }

    fn set_strength(&mut self, profile: &EngineProfile) -> Result<(), OracleError> {
        self.calls.lock().unwrap().strengths.push(*profile);
        Ok(())
    }

    fn set_position(&mut self, fen: &str) -> Result<(), OracleError> {
        self.calls.lock().unwrap().positions.push(fen.to_string());
        Ok(())
    }

    fn best_move_within(&mut self, budget: Duration) -> Result<Option<Move>, OracleError> {
        self.calls.lock().unwrap().budgets.push(budget);
        Ok(self.replies.pop_front().and_then(Move::from_uci))
    }
}

/// Always plays the first legal move it finds.
#[derive(Default)]
pub struct FirstLegalOracle {
    position: Option<Position>,
}

impl Oracle for FirstLegalOracle {
    fn name(&self) -> String {
        "FirstLegal".to_string()
    }

    fn new_game(&mut self) -> Result<(), OracleError> {
        self.position = None;
        Ok(())
    }

    fn set_strength(&mut self, _profile: &EngineProfile) -> Result<(), OracleError> {
        Ok(())
    }

    fn set_position(&mut self, fen: &str) -> Result<(), OracleError> {
        let position = StandardRules
            .decode(fen)
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        self.position = Some(position);
        Ok(())
    }

    fn best_move_within(&mut self, _budget: Duration) -> Result<Option<Move>, OracleError> {
        Ok(self
            .position
            .as_ref()
            .and_then(|p| StandardRules.legal_moves(p).into_iter().next()))
    }
}

/// Fails every search.
pub struct FailingOracle;

impl Oracle for FailingOracle {
    fn name(&self) -> String {
        "Failing".to_string()
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

    fn best_move_within(&mut self, budget: Duration) -> Result<Option<Move>, OracleError> {
        Err(OracleError::Engine(uci::UciError::Timeout(budget)))
    }
}

pub fn session_with(oracle: impl Oracle + 'static) -> Session {
    Session::new(OracleAdapter::new(oracle), DifficultyTier::Weakest)
}

/// A session whose oracle answers from `replies`, plus the record of its calls.
pub fn scripted(replies: &[&'static str]) -> (Session, Calls) {
    let (oracle, calls) = ScriptedOracle::new(replies);
    (session_with(oracle), calls)
}
