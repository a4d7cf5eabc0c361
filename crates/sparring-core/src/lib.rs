//! Human-vs-engine chess sessions.
//!
//! A [`Session`] holds one game between a human and a move-suggestion
//! [`Oracle`]. It validates human moves through a [`RulesEngine`], asks the
//! oracle for a reply within the think time of the active [`DifficultyTier`],
//! and keeps a [`MoveLog`] from which undo/redo, the full [`GameHistory`] and
//! PGN export are all derived by replay.
//!
//! # Example
//!
//! ```
//! use sparring_core::{DifficultyTier, OracleAdapter, Session};
//!
//! let mut session = Session::new(OracleAdapter::none(), DifficultyTier::Weakest);
//! let status = session.apply_human_move("e2", "e4", None)?;
//! assert_eq!(status.move_count, 1);
//!
//! let status = session.undo()?;
//! assert_eq!(status.move_count, 0);
//! assert!(status.can_redo);
//! # Ok::<(), sparring_core::SessionError>(())
//! ```

pub mod difficulty;
pub mod engine_oracle;
pub mod error;
pub mod history;
pub mod move_log;
pub mod oracle;
pub mod pgn;
pub mod rules;
pub mod session;
pub mod shared;
pub mod status;

mod mov;
mod square;

pub use difficulty::{profile_for, DifficultyTier, EngineProfile, ParseTierError};
pub use engine_oracle::{UciOracle, UciOracleConfig};
pub use error::{CorruptHistory, SessionError};
pub use history::GameHistory;
pub use mov::{Move, Promotion};
pub use move_log::{MoveLog, MoveLogEntry, Originator, UndoneTurn};
pub use oracle::{NoOracle, Oracle, OracleAdapter, OracleError};
pub use rules::{GameOver, GameOverReason, Position, RulesEngine, Side, StandardRules};
pub use session::Session;
pub use shared::SharedSession;
pub use square::Square;
pub use status::{LastMove, StatusSnapshot};
