//! Move log and redo buffer.
//!
//! The log is the single source of truth for a game: every position, SAN list
//! and PGN export is rebuilt from it by replaying moves from the initial
//! position. Undone turns are kept in a stack so they can be redone until the
//! human makes a new move.

use crate::error::CorruptHistory;
use crate::rules::{Position, RulesEngine};
use crate::Move;
use serde::Serialize;

/// Who played a logged move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Originator {
    Human,
    Oracle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveLogEntry {
    pub mv: Move,
    pub originator: Originator,
}

impl MoveLogEntry {
    pub const fn human(mv: Move) -> Self {
        MoveLogEntry {
            mv,
            originator: Originator::Human,
        }
    }

    pub const fn oracle(mv: Move) -> Self {
        MoveLogEntry {
            mv,
            originator: Originator::Oracle,
        }
    }
}

/// One undone turn: the human move and the reply it received, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoneTurn {
    pub human: MoveLogEntry,
    pub oracle: Option<MoveLogEntry>,
}

/// Ordered record of every move applied since the last restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLog {
    entries: Vec<MoveLogEntry>,
    redo: Vec<UndoneTurn>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. A human move starts a new branch and discards every
    /// undone turn.
    pub fn append(&mut self, entry: MoveLogEntry) {
        if entry.originator == Originator::Human {
            self.redo.clear();
        }
        self.entries.push(entry);
    }

    /// Appends an entry coming back from the redo buffer, leaving the rest of
    /// the buffer intact.
    pub fn append_redone(&mut self, entry: MoveLogEntry) {
        self.entries.push(entry);
    }

    /// Removes the last `n` entries (fewer if the log is shorter) and returns
    /// them most recent first.
    pub fn truncate_last(&mut self, n: usize) -> Vec<MoveLogEntry> {
        let keep = self.entries.len().saturating_sub(n);
        let mut removed = self.entries.split_off(keep);
        removed.reverse();
        removed
    }

    /// Replays the log from `initial`.
    ///
    /// Returns `[initial, after move 1, ..., after move n]`.
    pub fn replay_from(
        &self,
        initial: &Position,
        rules: &dyn RulesEngine,
    ) -> Result<Vec<Position>, CorruptHistory> {
        replay(initial, self.moves(), rules)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MoveLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&MoveLogEntry> {
        self.entries.last()
    }

    /// Iterates over the logged moves in play order.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries.iter().map(|e| e.mv)
    }

    /// Empties both the log and the redo buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.redo.clear();
    }

    pub fn push_redo(&mut self, turn: UndoneTurn) {
        self.redo.push(turn);
    }

    pub fn pop_redo(&mut self) -> Option<UndoneTurn> {
        self.redo.pop()
    }

    pub fn peek_redo(&self) -> Option<&UndoneTurn> {
        self.redo.last()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

/// Applies `moves` one by one from `initial`, collecting every position.
///
/// Fails at the first move the rules engine refuses, reporting its 1-based ply.
pub fn replay(
    initial: &Position,
    moves: impl IntoIterator<Item = Move>,
    rules: &dyn RulesEngine,
) -> Result<Vec<Position>, CorruptHistory> {
    let mut positions = vec![initial.clone()];
    for (i, mv) in moves.into_iter().enumerate() {
        let current = positions.last().unwrap_or(initial);
        let next = rules
            .apply(current, mv)
            .ok_or(CorruptHistory { ply: i + 1, mv })?;
        positions.push(next);
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardRules;

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    #[test]
    fn human_move_clears_redo() {
        let mut log = MoveLog::new();
        log.push_redo(UndoneTurn {
            human: MoveLogEntry::human(mv("e2e4")),
            oracle: None,
        });
        log.append(MoveLogEntry::oracle(mv("e7e5")));
        assert_eq!(log.redo_len(), 1);
        log.append(MoveLogEntry::human(mv("d2d4")));
        assert_eq!(log.redo_len(), 0);
    }

    #[test]
    fn append_redone_keeps_buffer() {
        let mut log = MoveLog::new();
        let turn = UndoneTurn {
            human: MoveLogEntry::human(mv("e2e4")),
            oracle: Some(MoveLogEntry::oracle(mv("e7e5"))),
        };
        log.push_redo(turn);
        log.push_redo(turn);
        log.append_redone(MoveLogEntry::human(mv("e2e4")));
        assert_eq!(log.redo_len(), 2);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn truncate_last_returns_most_recent_first() {
        let mut log = MoveLog::new();
        for (i, u) in ["e2e4", "e7e5", "g1f3"].iter().enumerate() {
            let entry = if i % 2 == 0 {
                MoveLogEntry::human(mv(u))
            } else {
                MoveLogEntry::oracle(mv(u))
            };
            log.append(entry);
        }
        let removed = log.truncate_last(2);
        assert_eq!(
            removed,
            vec![MoveLogEntry::human(mv("g1f3")), MoveLogEntry::oracle(mv("e7e5"))]
        );
        assert_eq!(log.len(), 1);
        assert_eq!(log.truncate_last(5).len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn replay_returns_every_position() {
        let rules = StandardRules;
        let mut log = MoveLog::new();
        log.append(MoveLogEntry::human(mv("e2e4")));
        log.append(MoveLogEntry::oracle(mv("e7e5")));
        let positions = log.replay_from(&rules.initial_position(), &rules).unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(
            positions[2].fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn replay_reports_corrupt_ply() {
        let rules = StandardRules;
        let mut log = MoveLog::new();
        log.append(MoveLogEntry::human(mv("e2e4")));
        log.append(MoveLogEntry::oracle(mv("e2e4")));
        let err = log
            .replay_from(&rules.initial_position(), &rules)
            .unwrap_err();
        assert_eq!(err, CorruptHistory { ply: 2, mv: mv("e2e4") });
    }

    #[test]
    fn clear_empties_everything() {
        let mut log = MoveLog::new();
        log.append(MoveLogEntry::human(mv("e2e4")));
        log.push_redo(UndoneTurn {
            human: MoveLogEntry::human(mv("d2d4")),
            oracle: None,
        });
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.redo_len(), 0);
        assert!(log.last().is_none());
    }
}
