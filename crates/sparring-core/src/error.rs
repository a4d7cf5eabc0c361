use crate::difficulty::ParseTierError;
use crate::rules::RulesError;
use crate::Move;
use thiserror::Error;

/// A stored move that no longer applies when the log is replayed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Move history is corrupt: {mv} is illegal at ply {ply}")]
pub struct CorruptHistory {
    /// 1-based index of the offending entry.
    pub ply: usize,
    pub mv: Move,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed input: bad square text, bad promotion letter, unparseable move.
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Unknown difficulty tier: '{0}'")]
    InvalidTier(String),
    #[error(transparent)]
    CorruptHistory(#[from] CorruptHistory),
    #[error("Invalid starting position: {0}")]
    InvalidPosition(#[from] RulesError),
    #[error("Session lock poisoned")]
    Poisoned,
}

impl From<ParseTierError> for SessionError {
    fn from(e: ParseTierError) -> Self {
        SessionError::InvalidTier(e.0)
    }
}

impl SessionError {
    /// Stable machine-readable kind, used in API error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            SessionError::Validation(_) => "validation",
            SessionError::IllegalMove(_) => "illegal_move",
            SessionError::InvalidTier(_) => "invalid_tier",
            SessionError::CorruptHistory(_) => "corrupt_history",
            SessionError::InvalidPosition(_) => "invalid_position",
            SessionError::Poisoned => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let corrupt = CorruptHistory {
            ply: 3,
            mv: Move::from_uci("e2e4").unwrap(),
        };
        assert_eq!(
            SessionError::from(corrupt).to_string(),
            "Move history is corrupt: e2e4 is illegal at ply 3"
        );
        assert_eq!(
            SessionError::from(ParseTierError("hard".to_string())).to_string(),
            "Unknown difficulty tier: 'hard'"
        );
        assert_eq!(SessionError::Poisoned.kind(), "internal");
        assert_eq!(
            SessionError::Validation("x".to_string()).kind(),
            "validation"
        );
    }
}
