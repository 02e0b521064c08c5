//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Every side effect of the supervisor goes through one of these traits.
//! They are synchronous: the supervisor processes one event at a time and
//! never awaits inside a transition.

use crate::domain::config::PersistedSettings;
use crate::domain::lifecycle::NodeSignal;
use crate::domain::wipe::WipeRecord;
use crate::error::{StoreError, SupervisorError, SupervisorResult};
use crate::events::ProcessEventSink;
use std::path::PathBuf;
use wallet_ipc::{Chain, SupervisorMessage};

/// Everything needed to start one node process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Starts node processes
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the process and route its events into `sink`.
    fn launch(
        &self,
        spec: &LaunchSpec,
        sink: ProcessEventSink,
    ) -> SupervisorResult<Box<dyn NodeProcess>>;
}

/// One live node process
pub trait NodeProcess: Send {
    /// OS process id, when known
    fn pid(&self) -> Option<u32>;

    /// Deliver a signal. Never escalates.
    fn kill(&mut self, signal: NodeSignal) -> SupervisorResult<()>;
}

/// Persisted wallet settings
///
/// Single-writer by application discipline.
pub trait SettingsStore: Send + Sync {
    /// Raw persisted chain selection
    fn chain(&self) -> Option<String>;

    fn set_chain(&self, chain: Chain) -> Result<(), StoreError>;

    /// Persisted mining preference
    fn mining_enabled(&self) -> bool;

    fn last_wipe(&self) -> Option<WipeRecord>;

    fn record_wipe(&self, record: &WipeRecord) -> Result<(), StoreError>;

    /// Inputs for the config resolver.
    fn persisted(&self) -> PersistedSettings {
        PersistedSettings {
            chain: self.chain(),
            mining_enabled: self.mining_enabled(),
            last_wiped_node_version: self.last_wipe().map(|record| record.node_version),
        }
    }
}

/// Fire-and-forget channel to the UI process
pub trait UiGateway: Send + Sync {
    fn send(&self, message: SupervisorMessage);

    /// Ask the UI to fully reload.
    fn request_reload(&self);
}

/// Blocking diagnostic surface for fatal conditions
pub trait DiagnosticPresenter: Send + Sync {
    fn show_error(&self, title: &str, detail: &str);
}

/// Application callbacks
pub trait LifecycleHooks: Send + Sync {
    /// The node is gone and the application should close.
    fn on_close(&self);

    /// A fatal failure; `tag` names its origin (`"node: spawn"`, ...).
    fn on_error(&self, error: &SupervisorError, tag: Option<&str>);
}

impl<T: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<T> {
    fn chain(&self) -> Option<String> {
        (**self).chain()
    }

    fn set_chain(&self, chain: Chain) -> Result<(), StoreError> {
        (**self).set_chain(chain)
    }

    fn mining_enabled(&self) -> bool {
        (**self).mining_enabled()
    }

    fn last_wipe(&self) -> Option<WipeRecord> {
        (**self).last_wipe()
    }

    fn record_wipe(&self, record: &WipeRecord) -> Result<(), StoreError> {
        (**self).record_wipe(record)
    }
}
