//! Sparring server
//!
//! Serves a single chess game between a human and a UCI engine over HTTP.

use anyhow::Context;
use clap::Parser;
use sparring_server::config::ServerConfig;
use sparring_server::{build_session, router, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sparring-server")]
#[command(about = "Play chess against a UCI engine over HTTP")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "sparring.toml")]
    config: PathBuf,

    /// Port to listen on, overriding the config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Run without an engine; moves are never answered.
    #[arg(long)]
    no_engine: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.no_engine {
        config.engine.enabled = false;
    }

    let addr = config.bind_addr();
    let session = tokio::task::spawn_blocking(move || build_session(&config))
        .await
        .context("starting session")?;
    let app = router(AppState::new(session));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from(["sparring-server", "--port", "8080", "--no-engine"]);
        assert_eq!(cli.port, Some(8080));
        assert!(cli.no_engine);
        assert_eq!(cli.config, PathBuf::from("sparring.toml"));
    }
}
