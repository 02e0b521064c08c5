//! Domain module for the node supervisor
//!
//! Pure logic, no I/O.
//!
//! ## Modules
//! - version_gate: Mandatory wipe decision
//! - config: Launch configuration and resolution
//! - args: Node argument vector
//! - log_buffer: Bounded diagnostic history
//! - lifecycle: States, signals, exit classification
//! - wipe: Persisted wipe record

pub mod args;
pub mod config;
pub mod lifecycle;
pub mod log_buffer;
pub mod version_gate;
pub mod wipe;

pub use args::build_args;
pub use config::{ConfigResolver, LaunchOverrides, NodeConfig, PersistedSettings, ResolvedLaunch};
pub use lifecycle::{classify_exit, ExitClass, NodeSignal, SupervisorState, CRASH_EXIT_CODE};
pub use log_buffer::{LogBuffer, LOG_BUFFER_CAPACITY};
pub use version_gate::{SemVer, VersionGate, WipeDecision};
pub use wipe::WipeRecord;
