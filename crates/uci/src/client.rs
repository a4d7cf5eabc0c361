//! UCI engine subprocess client.
//!
//! The engine's stdout is drained by a background thread into a channel so
//! every read can be bounded by a deadline. A search that overruns its budget
//! is answered with `stop` and reported as [`UciError::Timeout`]; callers are
//! expected to discard the client afterwards, since a late `bestmove` may still
//! be in flight.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use uci::{GoOptions, GuiCommand, UciClient};
//!
//! let mut client = UciClient::spawn("stockfish")?;
//! client.init(Duration::from_secs(2))?;
//! client.send(&GuiCommand::Position { fen: None, moves: vec![] })?;
//! let opts = GoOptions { movetime: Some(200), depth: None };
//! let best = client.go(&opts, Duration::from_millis(700))?;
//! println!("Best move: {:?}", best);
//! # Ok::<(), uci::UciError>(())
//! ```

use crate::{EngineMessage, GoOptions, GuiCommand, UciError};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How long to keep listening for `bestmove` after sending `stop`.
const STOP_DRAIN: Duration = Duration::from_millis(50);

/// A running UCI engine.
pub struct UciClient {
    /// The child process handle.
    process: Child,
    /// Handle to write commands to the engine's stdin.
    stdin: ChildStdin,
    /// Lines read from the engine's stdout by the reader thread.
    lines: Receiver<String>,
    /// The engine's name as reported during UCI initialization.
    name: String,
}

impl UciClient {
    /// Spawns an engine process.
    ///
    /// `command` is split on whitespace into program and arguments, so
    /// `"stockfish"` and `"/usr/bin/env stockfish"` both work. The UCI
    /// handshake is not performed; call [`init`](Self::init) next.
    pub fn spawn(command: &str) -> Result<Self, UciError> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let (program, args) = parts.split_first().ok_or_else(|| UciError::Spawn {
            command: command.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| UciError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = process.stdin.take().ok_or(UciError::Closed)?;
        let stdout = process.stdout.take().ok_or(UciError::Closed)?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(command, pid = process.id(), "Spawned UCI engine");

        Ok(Self {
            process,
            stdin,
            lines,
            name: String::new(),
        })
    }

    /// The engine's name from `id name`, empty before [`init`](Self::init).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a command to the engine.
    pub fn send(&mut self, cmd: &GuiCommand) -> Result<(), UciError> {
        let line = cmd.to_uci();
        tracing::trace!(%line, "> engine");
        writeln!(self.stdin, "{}", line)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads the next engine message, giving up at `deadline`.
    pub fn read_message(&mut self, deadline: Instant) -> Result<EngineMessage, UciError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                tracing::trace!(%line, "< engine");
                Ok(EngineMessage::parse(&line))
            }
            Err(RecvTimeoutError::Timeout) => Err(UciError::Timeout(remaining)),
            Err(RecvTimeoutError::Disconnected) => Err(UciError::Closed),
        }
    }

    /// Performs the `uci`/`uciok` and `isready`/`readyok` handshake.
    ///
    /// The engine's name is captured from the `id name` response.
    pub fn init(&mut self, timeout: Duration) -> Result<(), UciError> {
        let deadline = Instant::now() + timeout;
        self.send(&GuiCommand::Uci)?;
        loop {
            match self.read_message(deadline)? {
                EngineMessage::Id {
                    name: Some(name), ..
                } => self.name = name,
                EngineMessage::UciOk => break,
                _ => {}
            }
        }
        self.wait_ready(deadline)
    }

    /// Sends `isready` and waits for `readyok`.
    pub fn sync(&mut self, timeout: Duration) -> Result<(), UciError> {
        self.wait_ready(Instant::now() + timeout)
    }

    fn wait_ready(&mut self, deadline: Instant) -> Result<(), UciError> {
        self.send(&GuiCommand::IsReady)?;
        loop {
            if self.read_message(deadline)? == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
    }

    /// Starts a search and waits for `bestmove`.
    ///
    /// Returns `Ok(None)` when the engine has no move to offer (the position is
    /// terminal). If `timeout` elapses first, `stop` is sent and
    /// [`UciError::Timeout`] returned.
    pub fn go(&mut self, opts: &GoOptions, timeout: Duration) -> Result<Option<String>, UciError> {
        let started = Instant::now();
        let deadline = started + timeout;
        self.send(&GuiCommand::Go(opts.clone()))?;

        loop {
            match self.read_message(deadline) {
                Ok(EngineMessage::BestMove { mv, .. }) => {
                    tracing::debug!(
                        bestmove = mv.as_deref().unwrap_or("(none)"),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Engine answered"
                    );
                    return Ok(mv);
                }
                Ok(_) => {}
                Err(UciError::Timeout(_)) => {
                    self.send(&GuiCommand::Stop)?;
                    self.drain_bestmove();
                    return Err(UciError::Timeout(timeout));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Swallows the `bestmove` a stopped search still owes us, if it arrives quickly.
    fn drain_bestmove(&mut self) {
        let deadline = Instant::now() + STOP_DRAIN;
        while let Ok(msg) = self.read_message(deadline) {
            if matches!(msg, EngineMessage::BestMove { .. }) {
                break;
            }
        }
    }

    /// Gracefully shuts down the engine.
    pub fn quit(mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::Quit)?;
        let _ = self.process.wait();
        Ok(())
    }
}

impl Drop for UciClient {
    fn drop(&mut self) {
        let _ = self.send(&GuiCommand::Quit);
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
