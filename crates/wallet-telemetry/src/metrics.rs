//! Prometheus export for the wallet shell.
//!
//! Supervisor counters register themselves with the default registry; this
//! module adds process-level metrics and renders everything as text.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Supervisors built by this process (one per UI reload)
    pub static ref SUPERVISOR_SESSIONS: IntCounter = IntCounter::new(
        "wallet_supervisor_sessions_total",
        "Total number of supervisor instances created"
    ).expect("metric creation failed");

    /// Unix time the runtime started, in seconds
    pub static ref START_TIME_SECONDS: IntGauge = IntGauge::new(
        "wallet_start_time_seconds",
        "Unix time the wallet runtime started"
    ).expect("metric creation failed");

    /// Frames written to the UI
    pub static ref UI_FRAMES_WRITTEN: IntCounter = IntCounter::new(
        "wallet_ui_frames_written_total",
        "Total number of frames written to the UI"
    ).expect("metric creation failed");

    /// Lines from the UI that failed to decode
    pub static ref UI_FRAMES_REJECTED: IntCounter = IntCounter::new(
        "wallet_ui_frames_rejected_total",
        "Total number of UI lines that failed to decode"
    ).expect("metric creation failed");
}

/// Handle proving process metrics are registered
#[derive(Debug)]
pub struct MetricsHandle {
    _private: (),
}

impl MetricsHandle {
    /// Render the default registry in Prometheus text format.
    pub fn render(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }
}

/// Register process metrics with the default registry.
///
/// Registering twice is reported as an error.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SUPERVISOR_SESSIONS.clone()),
        Box::new(START_TIME_SECONDS.clone()),
        Box::new(UI_FRAMES_WRITTEN.clone()),
        Box::new(UI_FRAMES_REJECTED.clone()),
    ];

    let registry = prometheus::default_registry();
    for metric in metrics {
        registry
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    START_TIME_SECONDS.set(now);

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics in the default registry as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
