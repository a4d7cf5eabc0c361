//! Full game history rebuilt from the move log.

use crate::error::CorruptHistory;
use crate::move_log::MoveLog;
use crate::rules::{Position, RulesEngine};
use serde::Serialize;

/// Positions and notation for every ply of the game.
///
/// `fens[0]` is the starting position and `fens[i + 1]` the position after
/// `sans[i]`, so `fens` always has one more element than `sans`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GameHistory {
    pub fens: Vec<String>,
    pub sans: Vec<String>,
    #[serde(rename = "moves")]
    pub ucis: Vec<String>,
}

impl GameHistory {
    /// Number of plies.
    pub fn len(&self) -> usize {
        self.sans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sans.is_empty()
    }
}

/// Replays `log` from `initial`, recording FEN, SAN and UCI for each ply.
///
/// SAN is computed against the position before each move.
pub fn reconstruct(
    initial: &Position,
    log: &MoveLog,
    rules: &dyn RulesEngine,
) -> Result<GameHistory, CorruptHistory> {
    let mut history = GameHistory {
        fens: vec![rules.encode(initial)],
        ..GameHistory::default()
    };
    let mut position = initial.clone();

    for (i, mv) in log.moves().enumerate() {
        let corrupt = CorruptHistory { ply: i + 1, mv };
        let san = rules.to_san(&position, mv).ok_or(corrupt)?;
        position = rules.apply(&position, mv).ok_or(corrupt)?;
        history.fens.push(rules.encode(&position));
        history.sans.push(san);
        history.ucis.push(mv.to_uci());
    }

    Ok(history)
}
