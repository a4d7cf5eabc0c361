//! GUI-side UCI (Universal Chess Interface) protocol support.
//!
//! This crate is the "controller" half of UCI: it formats the commands a GUI
//! sends to an engine, parses the lines an engine writes back, and drives an
//! engine subprocess with deadline-bounded reads.
//!
//! # Commands sent
//!
//! - `uci` / `isready` / `ucinewgame` - Handshake and synchronization
//! - `setoption name <name> [value <value>]` - Strength tuning
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `stop` / `quit`
//!
//! # Replies parsed
//!
//! - `id name|author ...`, `uciok`, `readyok`
//! - `info ...` (kept as raw text)
//! - `bestmove <move> [ponder <move>]`, including `(none)` / `0000`

mod client;
mod command;

pub use client::UciClient;
pub use command::{GoOptions, GuiCommand};

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Failed to spawn engine '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine closed its output")]
    Closed,
    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information, unparsed.
    Info(String),
    /// Best move found. `mv` is `None` when the engine reports no move.
    BestMove { mv: Option<String>, ponder: Option<String> },
    /// Anything else (`option ...`, copyright banners, debug noise).
    Other(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next().unwrap_or("") {
            "uciok" => EngineMessage::UciOk,
            "readyok" => EngineMessage::ReadyOk,
            "info" => EngineMessage::Info(line.to_string()),
            "id" => {
                let field = parts.next();
                let value = parts.collect::<Vec<_>>().join(" ");
                match field {
                    Some("name") => EngineMessage::Id {
                        name: Some(value),
                        author: None,
                    },
                    Some("author") => EngineMessage::Id {
                        name: None,
                        author: Some(value),
                    },
                    _ => EngineMessage::Other(line.to_string()),
                }
            }
            "bestmove" => {
                let mv = parts
                    .next()
                    .filter(|m| *m != "(none)" && *m != "0000")
                    .map(str::to_string);
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(str::to_string),
                    _ => None,
                };
                EngineMessage::BestMove { mv, ponder }
            }
            _ => EngineMessage::Other(line.to_string()),
        }
    }
}
