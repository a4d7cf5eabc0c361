//! Oracle backed by a UCI engine process.

use crate::difficulty::EngineProfile;
use crate::oracle::{Oracle, OracleError};
use crate::Move;
use std::time::Duration;
use uci::{GoOptions, GuiCommand, UciClient, UciError};

/// How to launch and talk to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciOracleConfig {
    /// Command line; program followed by arguments.
    pub command: String,
    /// Budget for the `uci`/`isready` handshake and option syncs.
    pub startup_timeout: Duration,
    /// Extra wait on top of the think time before a search is abandoned.
    pub grace: Duration,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl Default for UciOracleConfig {
    fn default() -> Self {
        UciOracleConfig {
            command: "stockfish".to_string(),
            startup_timeout: Duration::from_secs(5),
            grace: Duration::from_millis(500),
            threads: None,
            hash_mb: None,
        }
    }
}

/// An [`Oracle`] that drives an external UCI engine.
///
/// The process is started on first use. Any engine error drops it, and the
/// next call starts a fresh one with the last strength and position restored.
pub struct UciOracle {
    config: UciOracleConfig,
    client: Option<UciClient>,
    strength: Option<EngineProfile>,
    position: Option<String>,
    engine_name: Option<String>,
}

impl UciOracle {
    pub fn new(config: UciOracleConfig) -> Self {
        UciOracle {
            config,
            client: None,
            strength: None,
            position: None,
            engine_name: None,
        }
    }

    /// True while an engine process is attached.
    pub fn is_running(&self) -> bool {
        self.client.is_some()
    }

    /// Starts the engine now instead of on the first request.
    pub fn warm_up(&mut self) -> Result<(), OracleError> {
        self.client().map(|_| ())
    }

    fn client(&mut self) -> Result<&mut UciClient, OracleError> {
        if self.client.is_none() {
            let client = self.start()?;
            self.client = Some(client);
        }
        self.client
            .as_mut()
            .ok_or_else(|| OracleError::Unavailable("engine not running".to_string()))
    }

    fn start(&mut self) -> Result<UciClient, OracleError> {
        let timeout = self.config.startup_timeout;
        let mut client = UciClient::spawn(&self.config.command)?;
        client.init(timeout)?;
        if let Some(threads) = self.config.threads {
            client.send(&GuiCommand::set_option("Threads", threads))?;
        }
        if let Some(hash) = self.config.hash_mb {
            client.send(&GuiCommand::set_option("Hash", hash))?;
        }
        if let Some(profile) = self.strength {
            send_strength(&mut client, &profile)?;
        }
        client.send(&GuiCommand::UciNewGame)?;
        if let Some(fen) = &self.position {
            client.send(&position_command(fen))?;
        }
        client.sync(timeout)?;

        tracing::info!(
            command = %self.config.command,
            engine = client.name(),
            "Engine ready"
        );
        if !client.name().is_empty() {
            self.engine_name = Some(client.name().to_string());
        }
        Ok(client)
    }

    /// Runs `f` against the engine, discarding the process if it fails.
    fn with_client<T>(
        &mut self,
        f: impl FnOnce(&mut UciClient) -> Result<T, UciError>,
    ) -> Result<T, OracleError> {
        let client = self.client()?;
        match f(client) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping engine process");
                self.client = None;
                Err(e.into())
            }
        }
    }
}

fn position_command(fen: &str) -> GuiCommand {
    GuiCommand::Position {
        fen: Some(fen.to_string()),
        moves: vec![],
    }
}

fn send_strength(client: &mut UciClient, profile: &EngineProfile) -> Result<(), UciError> {
    client.send(&GuiCommand::set_option("Skill Level", profile.skill_level))?;
    match profile.target_rating {
        Some(rating) => {
            client.send(&GuiCommand::set_option("UCI_LimitStrength", true))?;
            client.send(&GuiCommand::set_option("UCI_Elo", rating))?;
        }
        None => client.send(&GuiCommand::set_option("UCI_LimitStrength", false))?,
    }
    Ok(())
}

impl Oracle for UciOracle {
    fn name(&self) -> String {
        self.engine_name
            .clone()
            .unwrap_or_else(|| self.config.command.clone())
    }

    fn new_game(&mut self) -> Result<(), OracleError> {
        self.position = None;
        if self.client.is_none() {
            // A fresh process starts with `ucinewgame` anyway.
            return Ok(());
        }
        let timeout = self.config.startup_timeout;
        self.with_client(|c| {
            c.send(&GuiCommand::UciNewGame)?;
            c.sync(timeout)
        })
    }

    fn set_strength(&mut self, profile: &EngineProfile) -> Result<(), OracleError> {
        self.strength = Some(*profile);
        if self.client.is_none() {
            // Applied by `start`.
            return self.client().map(|_| ());
        }
        let timeout = self.config.startup_timeout;
        self.with_client(|c| {
            send_strength(c, profile)?;
            c.sync(timeout)
        })
    }

    fn set_position(&mut self, fen: &str) -> Result<(), OracleError> {
        self.position = Some(fen.to_string());
        let cmd = position_command(fen);
        self.with_client(|c| c.send(&cmd))
    }

    fn best_move_within(&mut self, budget: Duration) -> Result<Option<Move>, OracleError> {
        let opts = GoOptions {
            movetime: Some(budget.as_millis() as u64),
            depth: self.strength.and_then(|p| p.search_depth),
        };
        let deadline = budget + self.config.grace;
        let best = self.with_client(|c| c.go(&opts, deadline))?;
        match best {
            None => Ok(None),
            Some(text) => match Move::from_uci(&text) {
                Some(mv) => Ok(Some(mv)),
                None => {
                    self.client = None;
                    Err(OracleError::BadMove(text))
                }
            },
        }
    }
}
