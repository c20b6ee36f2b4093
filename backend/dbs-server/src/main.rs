//! dbs-server - runs one supervised database server
//!
//! Loads configuration, optionally bootstraps the data directory, starts the
//! database and keeps it running until SIGINT or SIGTERM.
//!
//! # Examples
//!
//! ```bash
//! # First run on an empty data directory
//! dbs-server --config-dir /etc/dbs --bootstrap
//!
//! # Initialize only
//! dbs-server --bootstrap-only
//! ```

mod cli;
mod error;
mod logger;
mod run_mode;


use crate::{
    cli::Cli,
    error::{AppError, Result as AppResult},
    run_mode::RunMode,
};

use dbs_config::Config;
use dbs_supervisor::Server;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("dbs-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };

    let config = Config::load_from(&config_dir)?;
    config.validate()?;

    logger::initialize(&config.logging, &config_dir.join(&config.logging.dir))?;

    info!("Starting dbs-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Registered before the child exists so an early signal is not lost.
    let signal = listen_for_signals()?;

    let mode = RunMode::resolve(&cli, &config.paths.databases);
    let server = Server::with_tracing(Arc::new(config))?;

    match mode {
        RunMode::BootstrapOnly => {
            server.bootstrap().await?;
            server.close().await?;
            info!("Bootstrap complete");
            return Ok(());
        }
        RunMode::Serve { bootstrap } => {
            if bootstrap {
                info!("Data directory not initialized yet, bootstrapping first");
            }
            server.start_with_bootstrap(bootstrap).await?;
        }
    }

    let received = signal.await.map_err(|_| AppError::SignalListenerGone)?;
    info!("Received signal {received}, shutting down...");

    server.terminate().await?;
    let status = server.close().await?;
    info!("Database server {}", status.state);

    Ok(())
}

/// First SIGINT or SIGTERM, delivered from a dedicated thread.
fn listen_for_signals() -> AppResult<oneshot::Receiver<i32>> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|source| AppError::Signals { source })?;
    let (signal_tx, signal_rx) = oneshot::channel();

    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            let _ = signal_tx.send(signal);
        }
    });

    Ok(signal_rx)
}
