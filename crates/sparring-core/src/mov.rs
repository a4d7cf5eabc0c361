//! Move representation.

use crate::Square;
use serde::{Serialize, Serializer};
use std::fmt;

/// Piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl Promotion {
    /// Parses a promotion piece from its UCI letter (either case).
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(Promotion::Knight),
            'b' => Some(Promotion::Bishop),
            'r' => Some(Promotion::Rook),
            'q' => Some(Promotion::Queen),
            _ => None,
        }
    }

    /// Parses a promotion hint such as `"q"` or `"queen"`.
    pub fn from_hint(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "knight" => Some(Promotion::Knight),
            "b" | "bishop" => Some(Promotion::Bishop),
            "r" | "rook" => Some(Promotion::Rook),
            "q" | "queen" => Some(Promotion::Queen),
            _ => None,
        }
    }

    /// Returns the lowercase UCI letter.
    pub const fn to_char(self) -> char {
        match self {
            Promotion::Knight => 'n',
            Promotion::Bishop => 'b',
            Promotion::Rook => 'r',
            Promotion::Queen => 'q',
        }
    }
}

/// A chess move: source, destination and optional promotion.
///
/// This is the compact form stored in the move log. It carries no knowledge
/// of the position; legality is decided by the rules engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Returns the same move with the given promotion piece.
    #[inline]
    pub const fn with_promotion(self, promotion: Promotion) -> Self {
        Move {
            promotion: Some(promotion),
            ..self
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        self.to_string()
    }

    /// Parses a move from UCI notation.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let mv = Move::new(from, to);
        match s[4..].chars().next() {
            Some(c) => Some(mv.with_promotion(Promotion::from_char(c)?)),
            None => Some(mv),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.to_char())?;
        }
        Ok(())
    }
}

impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn move_uci() {
        assert_eq!(Move::new(sq("e2"), sq("e4")).to_uci(), "e2e4");
        let promo = Move::new(sq("e7"), sq("e8")).with_promotion(Promotion::Queen);
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn move_from_uci() {
        let m = Move::from_uci("e2e4").unwrap();
        assert_eq!(m.from, sq("e2"));
        assert_eq!(m.to, sq("e4"));
        assert_eq!(m.promotion, None);

        let promo = Move::from_uci("a2a1N").unwrap();
        assert_eq!(promo.promotion, Some(Promotion::Knight));
    }

    #[test]
    fn move_from_uci_rejects_garbage() {
        assert!(Move::from_uci("invalid").is_none());
        assert!(Move::from_uci("e2e9").is_none());
        assert!(Move::from_uci("e2").is_none());
        assert!(Move::from_uci("e2e4qq").is_none());
        assert!(Move::from_uci("e7e8x").is_none());
        assert!(Move::from_uci("e2é4").is_none());
    }

    #[test]
    fn moves_are_equal_by_encoding() {
        let a = Move::from_uci("g1f3").unwrap();
        let b = Move::new(sq("g1"), sq("f3"));
        assert_eq!(a, b);
        assert_ne!(
            Move::from_uci("e7e8q").unwrap(),
            Move::from_uci("e7e8r").unwrap()
        );
    }

    #[test]
    fn promotion_hints() {
        assert_eq!(Promotion::from_hint("Q"), Some(Promotion::Queen));
        assert_eq!(Promotion::from_hint(" rook "), Some(Promotion::Rook));
        assert_eq!(Promotion::from_hint("king"), None);
        assert_eq!(Promotion::from_char('B'), Some(Promotion::Bishop));
    }

    #[test]
    fn move_debug_display() {
        let m = Move::new(sq("e2"), sq("e4"));
        assert_eq!(format!("{:?}", m), "Move(e2e4)");
        assert_eq!(format!("{}", m), "e2e4");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"e2e4\"");
    }
}
