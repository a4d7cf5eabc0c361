//! Rules engine abstraction.
//!
//! The session never inspects a board itself. Legal-move generation, check
//! and game-over detection, SAN and FEN are all delegated to a [`RulesEngine`].
//! [`StandardRules`] implements it for standard chess on top of `shakmaty`.

use crate::{Move, Square};
use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position as _};
use std::fmt;
use thiserror::Error;

/// Half-moves without capture or pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position after which the game is drawn.
pub const FIVEFOLD: usize = 5;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// An immutable game position.
///
/// Applying a move always produces a new `Position`; the old one is left
/// untouched. Two positions compare equal when their FEN encodings do.
#[derive(Clone)]
pub struct Position(Chess);

impl Position {
    /// FEN encoding of this position.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.0, EnPassantMode::Legal).to_string()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.fen())
    }
}

/// The side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
}

impl GameOverReason {
    /// Returns true for every reason except checkmate.
    pub const fn is_draw(self) -> bool {
        !matches!(self, GameOverReason::Checkmate)
    }
}

/// A terminal position's verdict. `winner` is `None` for draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOver {
    pub reason: GameOverReason,
    pub winner: Option<Side>,
}

impl GameOver {
    /// PGN result token: `1-0`, `0-1` or `1/2-1/2`.
    pub const fn result_token(&self) -> &'static str {
        match self.winner {
            Some(Side::White) => "1-0",
            Some(Side::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Everything the session needs to know about the rules of chess.
pub trait RulesEngine: Send + Sync {
    /// Returns the starting position.
    fn initial_position(&self) -> Position;

    /// All legal moves in `position`.
    fn legal_moves(&self, position: &Position) -> Vec<Move>;

    /// Applies `mv`, returning `None` if it is illegal in `position`.
    fn apply(&self, position: &Position, mv: Move) -> Option<Position>;

    /// Returns true if `mv` is legal in `position`.
    fn is_legal(&self, position: &Position, mv: Move) -> bool {
        self.apply(position, mv).is_some()
    }

    /// The verdict for a terminal position, `None` while play continues.
    fn game_over(&self, position: &Position) -> Option<GameOver>;

    /// Square of the side-to-move's king if it is in check.
    fn check_info(&self, position: &Position) -> Option<Square>;

    /// SAN for `mv` played from `position`, `None` if illegal.
    fn to_san(&self, position: &Position, mv: Move) -> Option<String>;

    fn side_to_move(&self, position: &Position) -> Side;

    /// Identity of `position` for repetition counting: placement, side to
    /// move, castling rights and en passant square, without the clocks.
    fn repetition_key(&self, position: &Position) -> String {
        self.encode(position)
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Draw verdict when the last of `positions` has occurred at least
    /// five times among them.
    fn repetition_verdict(&self, positions: &[Position]) -> Option<GameOver> {
        let current = self.repetition_key(positions.last()?);
        let seen = positions
            .iter()
            .filter(|p| self.repetition_key(p) == current)
            .count();
        (seen >= FIVEFOLD).then_some(GameOver {
            reason: GameOverReason::FivefoldRepetition,
            winner: None,
        })
    }

    /// FEN encoding.
    fn encode(&self, position: &Position) -> String {
        position.fen()
    }

    /// Parses a FEN string.
    fn decode(&self, fen: &str) -> Result<Position, RulesError>;
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    /// Resolves our compact move to a legal `shakmaty` move.
    ///
    /// Going through UCI text lets `shakmaty` handle castling (`e1g1`) and
    /// en passant without any special cases here.
    fn resolve(position: &Position, mv: Move) -> Option<shakmaty::Move> {
        let uci: UciMove = mv.to_uci().parse().ok()?;
        uci.to_move(&position.0).ok()
    }
}

fn convert_square(sq: shakmaty::Square) -> Option<Square> {
    Square::from_algebraic(&sq.to_string())
}

impl RulesEngine for StandardRules {
    fn initial_position(&self) -> Position {
        Position(Chess::default())
    }

    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        position
            .0
            .legal_moves()
            .into_iter()
            .filter_map(|m| Move::from_uci(&m.to_uci(CastlingMode::Standard).to_string()))
            .collect()
    }

    fn apply(&self, position: &Position, mv: Move) -> Option<Position> {
        let m = Self::resolve(position, mv)?;
        position.0.clone().play(m).ok().map(Position)
    }

    fn game_over(&self, position: &Position) -> Option<GameOver> {
        let pos = &position.0;
        if pos.is_checkmate() {
            return Some(GameOver {
                reason: GameOverReason::Checkmate,
                winner: Some(Side::from(pos.turn()).opposite()),
            });
        }
        let reason = if pos.is_stalemate() {
            GameOverReason::Stalemate
        } else if pos.is_insufficient_material() {
            GameOverReason::InsufficientMaterial
        } else if pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            GameOverReason::SeventyFiveMoveRule
        } else {
            return None;
        };
        Some(GameOver {
            reason,
            winner: None,
        })
    }

    fn check_info(&self, position: &Position) -> Option<Square> {
        let pos = &position.0;
        if !pos.is_check() {
            return None;
        }
        pos.board().king_of(pos.turn()).and_then(convert_square)
    }

    fn to_san(&self, position: &Position, mv: Move) -> Option<String> {
        let m = Self::resolve(position, mv)?;
        Some(SanPlus::from_move(position.0.clone(), m).to_string())
    }

    fn side_to_move(&self, position: &Position) -> Side {
        position.0.turn().into()
    }

    fn decode(&self, fen: &str) -> Result<Position, RulesError> {
        let invalid = |reason: String| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map(Position)
            .map_err(|e| invalid(format!("{}", e)))
    }
}
