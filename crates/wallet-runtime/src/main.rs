//! # Wallet Runtime
//!
//! Hosts the node supervisor for the desktop wallet.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line, initialize logging and metrics
//! 2. Resolve paths and launch overrides, open the settings file
//! 3. Start the stdio bridge to the UI process
//! 4. Run supervisor sessions until the node closes, crashes or the user quits
//!
//! The process exit code is 0 for a normal close and 1 for a crash or a
//! spawn/runtime failure.

use anyhow::{Context, Result};
use clap::Parser;
use node_supervisor::SupervisorExit;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use wallet_runtime::{bridge, run_sessions, Args, RuntimeConfig, WalletContainer};
use wallet_telemetry::{init_telemetry, TelemetryConfig};

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

async fn run(args: Args) -> Result<SupervisorExit> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env().with_service_name("wallet-runtime"))
        .context("initializing telemetry")?;

    let config = RuntimeConfig::from_args(&args);
    info!(
        wallet_version = %config.wallet_version,
        node_version = %config.node_version,
        "Starting wallet runtime"
    );

    let container = WalletContainer::new(config)?;
    let writer = bridge::spawn_writer(container.bus().subscribe(), tokio::io::stdout());
    let (inbound_tx, mut inbound) = mpsc::unbounded_channel();
    let reader = bridge::spawn_reader(tokio::io::stdin(), inbound_tx);

    let exit = run_sessions(&container, &mut inbound, ctrl_c()).await;
    info!(?exit, "Wallet runtime stopping");

    // Closes the bus so the writer drains and returns.
    drop(container);
    match writer.await {
        Ok(Ok(written)) => info!(written, "UI output flushed"),
        Ok(Err(e)) => warn!(error = %e, "UI output closed early"),
        Err(e) => error!(error = %e, "UI writer task failed"),
    }
    reader.abort();

    Ok(exit)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let code = match run(args).await {
        Ok(exit) => exit.exit_code(),
        Err(e) => {
            eprintln!("wallet-runtime: {e:#}");
            1
        }
    };
    // The stdin reader may still be parked in a blocking read.
    std::process::exit(code);
}
