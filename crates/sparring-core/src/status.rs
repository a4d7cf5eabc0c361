//! Snapshot of the session returned after every operation.

use crate::difficulty::DifficultyTier;
use crate::rules::{GameOver, Side};
use crate::{Move, Square};
use serde::Serialize;

/// The most recent move on the board, for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
    pub uci: String,
}

impl From<Move> for LastMove {
    fn from(mv: Move) -> Self {
        LastMove {
            from: mv.from,
            to: mv.to,
            uci: mv.to_uci(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub fen: String,
    pub turn: Side,
    pub in_check: bool,
    /// Square of the king in check, if any.
    pub checked_king: Option<Square>,
    pub game_over: Option<GameOver>,
    pub last_move: Option<LastMove>,
    pub tier: DifficultyTier,
    pub can_undo: bool,
    pub can_redo: bool,
    pub move_count: usize,
}

impl StatusSnapshot {
    pub fn is_concluded(&self) -> bool {
        self.game_over.is_some()
    }
}
