//! # node-supervisor
//!
//! Launches and supervises the local blockchain node on behalf of the
//! desktop wallet.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Version-gated wipes**: mandatory data wipe when the node's on-disk
//!   format changed since the last recorded wipe
//! - **Config resolution**: environment, command line and persisted settings
//!   merged into one launch configuration
//! - **Lifecycle state machine**: restart, shutdown and exit classification
//!   for at most one live node process
//! - **Bounded diagnostics**: the last 100 output lines, attached to crash
//!   reports
//!
//! ## Architecture
//!
//! ```text
//! ConfigResolver (VersionGate + SettingsStore) ──→ Supervisor::new
//!                                                     │
//!                                  init() ──→ build_args ──→ ProcessLauncher
//!                                                     │
//! node stdout/stderr ──→ LogBuffer ──→ UiGateway (`log`, `fatal-exit`)
//! UI commands ──→ SupervisorHandle ──→ handle_event ──→ NodeProcess::kill
//! ```
//!
//! ## Exit Classification
//!
//! | Exit | Class | Effect |
//! |------|-------|--------|
//! | restart signal | IntentionalRestart | logged |
//! | code 1 | Crash | dialog, `fatal-exit`, failure callback |
//! | anything else | NormalClose | close callback |
//!
//! ## Example
//!
//! ```rust,ignore
//! use node_supervisor::{ConfigResolver, LaunchOverrides, Supervisor, SupervisorPorts};
//!
//! let launch = ConfigResolver::new(LaunchOverrides::from_env()).resolve(&store.persisted());
//! let supervisor = Supervisor::new(ports, launch, options);
//! let handle = supervisor.handle();
//!
//! match supervisor.run().await {
//!     SupervisorExit::Reload => { /* rebuild */ }
//!     exit => std::process::exit(exit.exit_code()),
//! }
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    build_args, classify_exit, ConfigResolver, ExitClass, LaunchOverrides, LogBuffer, NodeConfig,
    NodeSignal, PersistedSettings, ResolvedLaunch, SemVer, SupervisorState, VersionGate,
    WipeRecord,
};
pub use error::{StoreError, SupervisorError, SupervisorResult};
pub use events::{Generation, ProcessEvent, ProcessEventSink, SupervisorEvent, SupervisorHandle};
pub use service::{
    Supervisor, SupervisorExit, SupervisorOptions, SupervisorPorts, RUNTIME_ERROR_TAG,
    SPAWN_ERROR_TAG,
};

/// Node release bundled with this wallet build
pub const DEFAULT_NODE_VERSION: &str = "0.9.30";
