//! Supervisor event channel
//!
//! UI commands and process events share one ordered channel into the
//! supervisor's transition function.
//!
//! ```text
//! stdio bridge ──Command / UiReady──┐
//! Ctrl-C ─────────────Quit──────────┼──→ mpsc ──→ Supervisor::handle_event
//! process adapter ──Process{gen}────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;
use wallet_ipc::UiCommand;

/// Launch generation; increases by one on every spawn attempt
pub type Generation = u64;

/// Something that happened to one node process
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessEvent {
    /// One chunk of standard output
    Stdout(String),
    /// One chunk of standard error
    Stderr(String),
    /// The process exited
    Exited {
        code: Option<i32>,
        /// Raw number of the terminating signal, if any
        signal: Option<i32>,
    },
    /// The process abstraction failed after launch
    RuntimeError(String),
}

/// Everything the supervisor reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupervisorEvent {
    Command(UiCommand),
    /// The UI finished loading
    UiReady,
    /// The application is quitting
    Quit,
    Process {
        generation: Generation,
        event: ProcessEvent,
    },
}

/// Sending half handed to a process adapter for one launch
#[derive(Clone, Debug)]
pub struct ProcessEventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<SupervisorEvent>,
}

impl ProcessEventSink {
    pub fn new(generation: Generation, tx: mpsc::UnboundedSender<SupervisorEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns `false` once the supervisor is gone.
    pub fn emit(&self, event: ProcessEvent) -> bool {
        let delivered = self
            .tx
            .send(SupervisorEvent::Process {
                generation: self.generation,
                event,
            })
            .is_ok();
        if !delivered {
            trace!(generation = self.generation, "Supervisor gone, process event dropped");
        }
        delivered
    }
}

/// Cloneable handle for feeding the supervisor from outside
#[derive(Clone, Debug)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<SupervisorEvent>,
    reload: Arc<AtomicBool>,
}

impl SupervisorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SupervisorEvent>, reload: Arc<AtomicBool>) -> Self {
        Self { tx, reload }
    }

    /// `true` once the supervisor has asked the UI to reload.
    ///
    /// Frames sent after this point come from the reloaded UI and belong to
    /// the next supervisor.
    pub fn reload_requested(&self) -> bool {
        self.reload.load(Ordering::Acquire)
    }

    /// Returns `false` once the supervisor is gone.
    pub fn send(&self, event: SupervisorEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn command(&self, command: UiCommand) -> bool {
        self.send(SupervisorEvent::Command(command))
    }

    pub fn ui_ready(&self) -> bool {
        self.send(SupervisorEvent::UiReady)
    }

    pub fn quit(&self) -> bool {
        self.send(SupervisorEvent::Quit)
    }
}
