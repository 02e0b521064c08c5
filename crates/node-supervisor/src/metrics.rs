//! # Supervisor Metrics
//!
//! Prometheus metrics for node lifecycle monitoring.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! node-supervisor = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `supervisor_node_launches_total` - Counter of successful node launches
//! - `supervisor_node_exits_total` - Counter of node exits (by class)
//! - `supervisor_restarts_total` - Counter of restarts requested by the UI
//! - `supervisor_log_lines_total` - Counter of node output chunks (by stream)
//! - `supervisor_outbound_queued_total` - Counter of messages parked until UI ready
//! - `supervisor_wipes_total` - Counter of launches that performed a wipe

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total successful node launches
    pub static ref NODE_LAUNCHES: IntCounter = register_int_counter!(
        "supervisor_node_launches_total",
        "Total number of successful node launches"
    )
    .expect("Failed to create NODE_LAUNCHES metric");

    /// Total node exits, labeled by class
    pub static ref NODE_EXITS: IntCounterVec = register_int_counter_vec!(
        "supervisor_node_exits_total",
        "Total number of node exits",
        &["class"]
    )
    .expect("Failed to create NODE_EXITS metric");

    /// Total restarts requested by the UI
    pub static ref RESTARTS: IntCounter = register_int_counter!(
        "supervisor_restarts_total",
        "Total number of restarts requested by the UI"
    )
    .expect("Failed to create RESTARTS metric");

    /// Total node output chunks, labeled by stream
    pub static ref LOG_LINES: IntCounterVec = register_int_counter_vec!(
        "supervisor_log_lines_total",
        "Total number of node output chunks",
        &["stream"]
    )
    .expect("Failed to create LOG_LINES metric");

    /// Total messages parked until the UI is ready
    pub static ref OUTBOUND_QUEUED: IntCounter = register_int_counter!(
        "supervisor_outbound_queued_total",
        "Total number of messages queued until UI ready"
    )
    .expect("Failed to create OUTBOUND_QUEUED metric");

    /// Total launches that performed a wipe
    pub static ref WIPES: IntCounter = register_int_counter!(
        "supervisor_wipes_total",
        "Total number of launches that performed a data wipe"
    )
    .expect("Failed to create WIPES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a successful launch
#[cfg(feature = "metrics")]
pub fn record_node_launch() {
    NODE_LAUNCHES.inc();
}

/// Record a node exit with its class
#[cfg(feature = "metrics")]
pub fn record_node_exit(class: &str) {
    NODE_EXITS.with_label_values(&[class]).inc();
}

/// Record a restart command
#[cfg(feature = "metrics")]
pub fn record_restart() {
    RESTARTS.inc();
}

/// Record one output chunk
#[cfg(feature = "metrics")]
pub fn record_log_line(stream: &str) {
    LOG_LINES.with_label_values(&[stream]).inc();
}

/// Record a message parked until UI ready
#[cfg(feature = "metrics")]
pub fn record_outbound_queued() {
    OUTBOUND_QUEUED.inc();
}

/// Record a launch that performed a wipe
#[cfg(feature = "metrics")]
pub fn record_wipe() {
    WIPES.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_node_launch() {}

#[cfg(not(feature = "metrics"))]
pub fn record_node_exit(_class: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_restart() {}

#[cfg(not(feature = "metrics"))]
pub fn record_log_line(_stream: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_outbound_queued() {}

#[cfg(not(feature = "metrics"))]
pub fn record_wipe() {}
