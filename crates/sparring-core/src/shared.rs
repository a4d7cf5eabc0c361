//! Lock-guarded session handle for concurrent callers.

use crate::error::SessionError;
use crate::history::GameHistory;
use crate::session::Session;
use crate::status::StatusSnapshot;
use std::sync::{Arc, RwLock};

/// A [`Session`] shared between request handlers.
///
/// Mutations take the write lock for their whole duration, including the
/// oracle search, so concurrent moves are applied one at a time. Reads take
/// the read lock. A lock poisoned by a panicking holder is reported as
/// [`SessionError::Poisoned`] from then on.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        SharedSession {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Runs `f` with exclusive access.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut session = self.inner.write().map_err(|_| SessionError::Poisoned)?;
        f(&mut session)
    }

    /// Runs `f` with shared access.
    pub fn read<T>(
        &self,
        f: impl FnOnce(&Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.inner.read().map_err(|_| SessionError::Poisoned)?;
        f(&session)
    }

    pub fn status(&self) -> Result<StatusSnapshot, SessionError> {
        self.read(|s| Ok(s.status()))
    }

    pub fn history(&self) -> Result<GameHistory, SessionError> {
        self.read(Session::history)
    }

    pub fn export_pgn(&self) -> Result<String, SessionError> {
        self.read(Session::export_pgn)
    }

    pub fn restart(&self) -> Result<StatusSnapshot, SessionError> {
        self.write(|s| Ok(s.restart()))
    }

    pub fn set_difficulty(&self, name: &str) -> Result<StatusSnapshot, SessionError> {
        self.write(|s| s.set_difficulty(name))
    }

    pub fn apply_human_move(
        &self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<StatusSnapshot, SessionError> {
        self.write(|s| s.apply_human_move(from, to, promotion))
    }

    pub fn apply_human_uci(&self, text: &str) -> Result<StatusSnapshot, SessionError> {
        self.write(|s| s.apply_human_uci(text))
    }

    pub fn undo(&self) -> Result<StatusSnapshot, SessionError> {
        self.write(Session::undo)
    }

    pub fn redo(&self) -> Result<StatusSnapshot, SessionError> {
        self.write(Session::redo)
    }
}

impl std::fmt::Debug for SharedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_read() {
            Ok(session) => f.debug_tuple("SharedSession").field(&*session).finish(),
            Err(_) => f.write_str("SharedSession(<locked>)"),
        }
    }
}
