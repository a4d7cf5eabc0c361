//! PGN (Portable Game Notation) export.
//!
//! Games are written with the Seven Tag Roster plus a `Difficulty` tag, and
//! `SetUp`/`FEN` tags when the game did not start from the standard position.
//! Movetext is SAN, wrapped at 80 columns without splitting tokens.

use crate::rules::Side;
use chrono::Utc;
use std::fmt::Write;

const LINE_WIDTH: usize = 80;

/// Result token for a game still in progress.
pub const IN_PROGRESS: &str = "*";

/// Tag pairs for one exported game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub difficulty: String,
    /// Starting FEN when it differs from the standard position.
    pub fen: Option<String>,
}

impl PgnHeaders {
    /// Headers for a human playing `human` against `opponent`, dated today.
    pub fn new(human: Side, opponent: &str, difficulty: &str, result: &str) -> Self {
        let (white, black) = match human {
            Side::White => ("Human", opponent),
            Side::Black => (opponent, "Human"),
        };
        PgnHeaders {
            event: "Sparring Game".to_string(),
            site: "local".to_string(),
            date: Utc::now().format("%Y.%m.%d").to_string(),
            round: "-".to_string(),
            white: white.to_string(),
            black: black.to_string(),
            result: result.to_string(),
            difficulty: difficulty.to_string(),
            fen: None,
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Splits a FEN into the side to move and fullmove number, defaulting to
/// White on move 1 when the fields are missing.
fn move_numbering(fen: Option<&str>) -> (bool, u32) {
    let Some(fen) = fen else {
        return (true, 1);
    };
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let white_to_move = fields.get(1).map_or(true, |side| *side != "b");
    let fullmove = fields
        .get(5)
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    (white_to_move, fullmove)
}

/// Builds the movetext tokens: move numbers, SAN moves and the result.
fn movetext_tokens(sans: &[String], start_fen: Option<&str>, result: &str) -> Vec<String> {
    let (mut white_to_move, mut number) = move_numbering(start_fen);
    let mut tokens = Vec::with_capacity(sans.len() * 3 / 2 + 1);

    for (i, san) in sans.iter().enumerate() {
        if white_to_move {
            tokens.push(format!("{}.", number));
        } else if i == 0 {
            tokens.push(format!("{}...", number));
        }
        tokens.push(san.clone());
        if !white_to_move {
            number += 1;
        }
        white_to_move = !white_to_move;
    }
    tokens.push(result.to_string());
    tokens
}

/// Joins tokens with spaces, breaking lines before they exceed the width.
fn wrap(tokens: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Renders a complete PGN document.
pub fn render(headers: &PgnHeaders, sans: &[String]) -> String {
    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        let _ = writeln!(out, "[{} \"{}\"]", name, escape(value));
    };

    tag("Event", &headers.event);
    tag("Site", &headers.site);
    tag("Date", &headers.date);
    tag("Round", &headers.round);
    tag("White", &headers.white);
    tag("Black", &headers.black);
    tag("Result", &headers.result);
    tag("Difficulty", &headers.difficulty);
    if let Some(fen) = &headers.fen {
        tag("SetUp", "1");
        tag("FEN", fen);
    }
    out.push('\n');

    let tokens = movetext_tokens(sans, headers.fen.as_deref(), &headers.result);
    for line in wrap(&tokens) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
