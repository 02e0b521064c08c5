//! Headless diagnostic presenter and lifecycle hooks
//!
//! Without a windowing system the blocking dialog becomes an `error` log
//! line. The hooks record the last failure so the host can pick an exit
//! code.

use crate::error::SupervisorError;
use crate::ports::{DiagnosticPresenter, LifecycleHooks};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

/// Presents fatal diagnostics through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPresenter;

impl DiagnosticPresenter for TracingPresenter {
    fn show_error(&self, title: &str, detail: &str) {
        error!(target: "diagnostic", %title, %detail, "{title}");
    }
}

/// A failure reported through [`LifecycleHooks::on_error`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportedFailure {
    pub message: String,
    pub tag: Option<String>,
}

/// Logs lifecycle callbacks and remembers what happened
#[derive(Clone, Debug, Default)]
pub struct TracingHooks {
    inner: Arc<Mutex<HookRecord>>,
}

#[derive(Debug, Default)]
struct HookRecord {
    closed: bool,
    failures: Vec<ReportedFailure>,
}

impl TracingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn failures(&self) -> Vec<ReportedFailure> {
        self.inner.lock().failures.clone()
    }
}

impl LifecycleHooks for TracingHooks {
    fn on_close(&self) {
        info!("Node supervisor requested application close");
        self.inner.lock().closed = true;
    }

    fn on_error(&self, error: &SupervisorError, tag: Option<&str>) {
        error!(error = %error, tag = tag.unwrap_or("node"), "Node supervisor failure");
        self.inner.lock().failures.push(ReportedFailure {
            message: error.to_string(),
            tag: tag.map(str::to_string),
        });
    }
}
