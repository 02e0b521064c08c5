//! # Wallet Telemetry
//!
//! Logging and metrics bootstrap for the wallet shell.
//!
//! ## Components
//!
//! - **Logs**: `tracing` with an env filter, pretty or JSON, on stderr
//! - **Metrics**: Prometheus default registry, rendered as text
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wallet_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Your application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WALLET_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `WALLET_JSON_LOGS` | `false` | JSON formatted logs |
//! | `WALLET_CONSOLE_OUTPUT` | `true` | Write logs at all |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, START_TIME_SECONDS, SUPERVISOR_SESSIONS,
    UI_FRAMES_REJECTED, UI_FRAMES_WRITTEN,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Initialize metrics first so startup is counted
    let metrics = register_metrics()?;

    logging::init_logging(&config)?;

    Ok(TelemetryGuard { metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        match self.metrics.render() {
            Ok(snapshot) => tracing::debug!(metrics = %snapshot, "Final metrics snapshot"),
            Err(e) => tracing::warn!(error = %e, "Failed to render metrics"),
        }
        tracing::info!("Shutting down telemetry...");
    }
}
