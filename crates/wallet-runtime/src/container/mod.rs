//! # Wallet Container
//!
//! Long-lived infrastructure shared by every supervisor the runtime builds:
//! the UI bus, the settings file and the resolved runtime configuration.
//! A supervisor lives for one UI session; the container lives for the
//! whole process.

pub mod config;

pub use config::RuntimeConfig;

use anyhow::{Context, Result};
use node_supervisor::adapters::{
    BusUiGateway, JsonFileStore, TokioProcessLauncher, TracingHooks, TracingPresenter,
};
use node_supervisor::ports::SettingsStore;
use node_supervisor::{ConfigResolver, Supervisor, SupervisorPorts};
use std::sync::Arc;
use tracing::info;
use wallet_ipc::InMemoryUiBus;

/// Supervisor wired to the production adapters.
pub type RuntimeSupervisor = Supervisor<
    TokioProcessLauncher,
    Arc<JsonFileStore>,
    BusUiGateway,
    TracingPresenter,
    TracingHooks,
>;

pub struct WalletContainer {
    config: RuntimeConfig,
    bus: Arc<InMemoryUiBus>,
    store: Arc<JsonFileStore>,
}

impl WalletContainer {
    /// Open the settings file and create the UI bus.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let path = config.settings_path();
        let store = JsonFileStore::open(&path)
            .with_context(|| format!("opening settings at {}", path.display()))?;
        info!(
            node_bin = %config.node_bin.display(),
            settings = %path.display(),
            "Wallet container initialized"
        );
        Ok(Self {
            config,
            bus: Arc::new(InMemoryUiBus::new()),
            store: Arc::new(store),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<InMemoryUiBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<JsonFileStore> {
        &self.store
    }

    /// Build a supervisor from the currently persisted settings.
    pub fn supervisor(&self) -> RuntimeSupervisor {
        let launch = ConfigResolver::new(self.config.overrides.clone()).resolve(&self.store.persisted());
        wallet_telemetry::SUPERVISOR_SESSIONS.inc();
        Supervisor::new(
            SupervisorPorts {
                launcher: TokioProcessLauncher::new(),
                store: Arc::clone(&self.store),
                ui: BusUiGateway::new(Arc::clone(&self.bus)),
                presenter: TracingPresenter,
                hooks: TracingHooks::new(),
            },
            launch,
            self.config.supervisor_options(),
        )
    }
}
