//! Game session state machine.
//!
//! A [`Session`] owns the live position, the move log with its redo buffer,
//! the active difficulty tier, the rules engine and the oracle adapter. Every
//! operation computes its new state first and commits only on success, so a
//! failed call leaves the session exactly as it was.

use crate::difficulty::{DifficultyTier, EngineProfile};
use crate::error::{CorruptHistory, SessionError};
use crate::history::{self, GameHistory};
use crate::move_log::{replay, MoveLog, MoveLogEntry, Originator, UndoneTurn};
use crate::oracle::OracleAdapter;
use crate::pgn::{self, PgnHeaders, IN_PROGRESS};
use crate::rules::{GameOver, Position, RulesEngine, StandardRules};
use crate::status::{LastMove, StatusSnapshot};
use crate::{Move, Promotion, Square};
use std::time::Instant;

/// One human-vs-oracle game.
pub struct Session {
    rules: Box<dyn RulesEngine>,
    oracle: OracleAdapter,
    initial: Position,
    position: Position,
    log: MoveLog,
    tier: DifficultyTier,
    /// Verdict for the current position and the history leading to it.
    game_over: Option<GameOver>,
}

impl Session {
    /// A session on standard rules from the standard starting position.
    pub fn new(oracle: OracleAdapter, tier: DifficultyTier) -> Self {
        Self::with_rules(Box::new(StandardRules), oracle, tier)
    }

    pub fn with_rules(
        rules: Box<dyn RulesEngine>,
        oracle: OracleAdapter,
        tier: DifficultyTier,
    ) -> Self {
        let initial = rules.initial_position();
        Session {
            game_over: rules.game_over(&initial),
            rules,
            oracle,
            position: initial.clone(),
            initial,
            log: MoveLog::new(),
            tier,
        }
    }

    /// A session on standard rules starting from `fen`. Restarts return to it.
    pub fn from_fen(
        fen: &str,
        oracle: OracleAdapter,
        tier: DifficultyTier,
    ) -> Result<Self, SessionError> {
        let rules = StandardRules;
        let initial = rules.decode(fen)?;
        Ok(Session {
            game_over: rules.game_over(&initial),
            rules: Box::new(rules),
            oracle,
            position: initial.clone(),
            initial,
            log: MoveLog::new(),
            tier,
        })
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn profile(&self) -> EngineProfile {
        self.tier.profile()
    }

    pub fn move_count(&self) -> usize {
        self.log.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.log.redo_len() > 0
    }

    pub fn fen(&self) -> String {
        self.rules.encode(&self.position)
    }

    pub fn is_concluded(&self) -> bool {
        self.game_over.is_some()
    }

    /// How the game ended, `None` while it is still going.
    pub fn game_over(&self) -> Option<GameOver> {
        self.game_over
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    /// Moves the human may play now, in UCI notation. Empty once the game
    /// is over, including by repetition.
    pub fn legal_moves(&self) -> Vec<String> {
        if self.is_concluded() {
            return Vec::new();
        }
        self.rules
            .legal_moves(&self.position)
            .into_iter()
            .map(Move::to_uci)
            .collect()
    }

    /// Starts over from the initial position, keeping the tier.
    pub fn restart(&mut self) -> StatusSnapshot {
        self.position = self.initial.clone();
        self.log.clear();
        self.game_over = self.rules.game_over(&self.initial);
        self.oracle.new_game();
        tracing::info!(tier = %self.tier, "Game restarted");
        self.status()
    }

    /// Switches tier by name and restarts. An unknown name changes nothing.
    pub fn set_difficulty(&mut self, name: &str) -> Result<StatusSnapshot, SessionError> {
        let tier: DifficultyTier = name.parse()?;
        Ok(self.set_tier(tier))
    }

    pub fn set_tier(&mut self, tier: DifficultyTier) -> StatusSnapshot {
        tracing::info!(from = %self.tier, to = %tier, "Difficulty changed");
        self.tier = tier;
        self.restart()
    }

    /// Plays a human move given as square names and an optional promotion hint.
    ///
    /// A pawn reaching the last rank without a hint is promoted to a queen.
    pub fn apply_human_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<StatusSnapshot, SessionError> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        let promotion = match promotion.map(str::trim) {
            None | Some("") => None,
            Some(hint) => Some(Promotion::from_hint(hint).ok_or_else(|| {
                SessionError::Validation(format!("Unknown promotion piece '{}'", hint))
            })?),
        };
        self.play_human(Move {
            from,
            to,
            promotion,
        })
    }

    /// Plays a human move given in UCI notation (`e2e4`, `e7e8q`).
    pub fn apply_human_uci(&mut self, text: &str) -> Result<StatusSnapshot, SessionError> {
        let text = text.trim();
        let mv = Move::from_uci(text)
            .ok_or_else(|| SessionError::Validation(format!("Malformed move '{}'", text)))?;
        self.play_human(mv)
    }

    fn play_human(&mut self, mv: Move) -> Result<StatusSnapshot, SessionError> {
        if let Some(over) = self.game_over {
            return Err(SessionError::IllegalMove(format!(
                "{} (game is over: {:?})",
                mv, over.reason
            )));
        }

        let (mv, next) = self
            .interpret(mv)
            .ok_or_else(|| SessionError::IllegalMove(mv.to_uci()))?;

        let mut log = self.log.clone();
        log.append(MoveLogEntry::human(mv));
        let game_over = self.conclusion(&log, &next)?;
        self.commit(log, next, game_over);
        tracing::debug!(uci = %mv, ply = self.log.len(), "Human move");

        if !self.is_concluded() {
            self.request_reply();
        }
        Ok(self.status())
    }

    /// Verdict for `position` reached by playing `log` from the start:
    /// the position's own verdict, else fivefold repetition.
    fn conclusion(
        &self,
        log: &MoveLog,
        position: &Position,
    ) -> Result<Option<GameOver>, CorruptHistory> {
        if let Some(over) = self.rules.game_over(position) {
            return Ok(Some(over));
        }
        let positions = replay(&self.initial, log.moves(), self.rules.as_ref())?;
        Ok(self.rules.repetition_verdict(&positions))
    }

    fn commit(&mut self, log: MoveLog, position: Position, game_over: Option<GameOver>) {
        self.log = log;
        self.position = position;
        self.game_over = game_over;
    }

    /// Finds the legal reading of `mv`: as given, or as a queen promotion.
    fn interpret(&self, mv: Move) -> Option<(Move, Position)> {
        if let Some(next) = self.rules.apply(&self.position, mv) {
            return Some((mv, next));
        }
        if mv.promotion.is_some() {
            return None;
        }
        let queened = mv.with_promotion(Promotion::Queen);
        self.rules
            .apply(&self.position, queened)
            .map(|next| (queened, next))
    }

    /// Asks the oracle for a reply and plays it if it is legal.
    fn request_reply(&mut self) {
        let fen = self.fen();
        let profile = self.profile();
        let started = Instant::now();

        match self.oracle.suggest(&fen, &profile) {
            Ok(Some(reply)) => match self.rules.apply(&self.position, reply) {
                Some(next) => {
                    let mut log = self.log.clone();
                    log.append(MoveLogEntry::oracle(reply));
                    match self.conclusion(&log, &next) {
                        Ok(game_over) => {
                            self.commit(log, next, game_over);
                            tracing::debug!(
                                uci = %reply,
                                ply = self.log.len(),
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "Oracle reply"
                            );
                        }
                        Err(e) => tracing::warn!(uci = %reply, error = %e, "Dropping oracle reply"),
                    }
                }
                None => {
                    tracing::warn!(uci = %reply, fen = %fen, "Ignoring illegal oracle move");
                }
            },
            Ok(None) => tracing::debug!(fen = %fen, "Oracle has no reply"),
            Err(e) => {
                tracing::warn!(error = %e, tier = %self.tier, "Oracle failed; no reply this turn")
            }
        }
    }

    /// Takes back the last turn: the oracle reply and the human move before
    /// it, or a lone human move that got no reply. No-op on an empty log.
    pub fn undo(&mut self) -> Result<StatusSnapshot, SessionError> {
        let entries = self.log.entries();
        let Some(last) = entries.last() else {
            return Ok(self.status());
        };
        let paired = last.originator == Originator::Oracle
            && entries.len() >= 2
            && entries[entries.len() - 2].originator == Originator::Human;

        let mut log = self.log.clone();
        let removed = log.truncate_last(if paired { 2 } else { 1 });
        let turn = match removed.as_slice() {
            [reply, human] => UndoneTurn {
                human: *human,
                oracle: Some(*reply),
            },
            [human] if human.originator == Originator::Human => UndoneTurn {
                human: *human,
                oracle: None,
            },
            _ => {
                return Err(CorruptHistory {
                    ply: self.log.len(),
                    mv: last.mv,
                }
                .into())
            }
        };
        log.push_redo(turn);

        let position = self.replay_to_end(&log)?;
        let game_over = self.conclusion(&log, &position)?;
        self.commit(log, position, game_over);
        tracing::debug!(plies = removed.len(), "Undo");
        Ok(self.status())
    }

    /// Re-applies the most recently undone turn. No-op when nothing is undone.
    pub fn redo(&mut self) -> Result<StatusSnapshot, SessionError> {
        let Some(turn) = self.log.peek_redo().copied() else {
            return Ok(self.status());
        };

        let mut log = self.log.clone();
        log.pop_redo();
        let mut position = self.position.clone();
        for entry in std::iter::once(turn.human).chain(turn.oracle) {
            position = self
                .rules
                .apply(&position, entry.mv)
                .ok_or(CorruptHistory {
                    ply: log.len() + 1,
                    mv: entry.mv,
                })?;
            log.append_redone(entry);
        }

        let game_over = self.conclusion(&log, &position)?;
        self.commit(log, position, game_over);
        tracing::debug!(uci = %turn.human.mv, "Redo");
        Ok(self.status())
    }

    fn replay_to_end(&self, log: &MoveLog) -> Result<Position, CorruptHistory> {
        let mut positions = replay(&self.initial, log.moves(), self.rules.as_ref())?;
        Ok(positions.pop().unwrap_or_else(|| self.initial.clone()))
    }

    pub fn status(&self) -> StatusSnapshot {
        let checked_king = self.rules.check_info(&self.position);
        StatusSnapshot {
            fen: self.fen(),
            turn: self.rules.side_to_move(&self.position),
            in_check: checked_king.is_some(),
            checked_king,
            game_over: self.game_over,
            last_move: self.log.last().map(|e| LastMove::from(e.mv)),
            tier: self.tier,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            move_count: self.log.len(),
        }
    }

    /// Positions, SAN and UCI for every ply, rebuilt from the log.
    pub fn history(&self) -> Result<GameHistory, SessionError> {
        Ok(history::reconstruct(
            &self.initial,
            &self.log,
            self.rules.as_ref(),
        )?)
    }

    /// Exports the game so far as PGN. The human plays the side to move in
    /// the initial position.
    pub fn export_pgn(&self) -> Result<String, SessionError> {
        let history = self.history()?;
        let result = self
            .game_over
            .map_or(IN_PROGRESS, |over| over.result_token());

        let human = self.rules.side_to_move(&self.initial);
        let mut headers = PgnHeaders::new(human, &self.oracle.name(), self.tier.name(), result);
        if self.initial != self.rules.initial_position() {
            headers.fen = Some(self.rules.encode(&self.initial));
        }
        Ok(pgn::render(&headers, &history.sans))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("fen", &self.fen())
            .field("tier", &self.tier)
            .field("moves", &self.log.len())
            .field("redo", &self.log.redo_len())
            .field("game_over", &self.game_over)
            .finish()
    }
}

fn parse_square(text: &str) -> Result<Square, SessionError> {
    Square::from_algebraic(text.trim())
        .ok_or_else(|| SessionError::Validation(format!("Invalid square '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(OracleAdapter::none(), DifficultyTier::Weakest)
    }

    #[test]
    fn fresh_session() {
        let s = session();
        let status = s.status();
        assert_eq!(status.move_count, 0);
        assert!(!status.can_undo);
        assert!(!status.can_redo);
        assert!(!status.in_check);
        assert!(status.last_move.is_none());
        assert_eq!(s.legal_moves().len(), 20);
    }

    #[test]
    fn malformed_squares_are_validation_errors() {
        let mut s = session();
        for (from, to) in [("e2", "e9"), ("i2", "e4"), ("", "e4"), ("e2", "e44")] {
            let err = s.apply_human_move(from, to, None).unwrap_err();
            assert!(matches!(err, SessionError::Validation(_)), "{from}-{to}");
        }
        assert!(matches!(
            s.apply_human_move("e2", "e4", Some("x")),
            Err(SessionError::Validation(_))
        ));
        assert!(matches!(
            s.apply_human_uci("e2-e4"),
            Err(SessionError::Validation(_))
        ));
        assert_eq!(s.move_count(), 0);
    }

    #[test]
    fn lone_human_move_without_oracle() {
        let mut s = session();
        let status = s.apply_human_move("e2", "e4", None).unwrap();
        assert_eq!(status.move_count, 1);
        assert_eq!(status.turn, crate::Side::Black);
        let undone = s.undo().unwrap();
        assert_eq!(undone.move_count, 0);
        assert!(undone.can_redo);
    }

    #[test]
    fn human_as_black_is_tagged_black() {
        let fen = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 1";
        let mut s = Session::from_fen(fen, OracleAdapter::none(), DifficultyTier::Weakest).unwrap();
        s.apply_human_uci("e7e5").unwrap();
        let pgn = s.export_pgn().unwrap();
        assert!(pgn.contains("[White \"No engine\"]"));
        assert!(pgn.contains("[Black \"Human\"]"));
        assert!(pgn.contains("1... e5 *"));
    }

    #[test]
    fn from_fen_restarts_to_its_start() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
        let mut s = Session::from_fen(fen, OracleAdapter::none(), DifficultyTier::Weakest).unwrap();
        s.apply_human_uci("e2e4").unwrap();
        assert_ne!(s.fen(), fen);
        assert_eq!(s.restart().fen, fen);
        assert!(matches!(
            Session::from_fen("garbage", OracleAdapter::none(), DifficultyTier::Weakest),
            Err(SessionError::InvalidPosition(_))
        ));
    }
}
