//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits for the desktop runtime.

mod diagnostics;
mod process;
mod store;
mod ui;

pub use diagnostics::{ReportedFailure, TracingHooks, TracingPresenter};
pub use process::{TokioNodeProcess, TokioProcessLauncher};
pub use store::{InMemoryStore, JsonFileStore, SettingsDocument};
pub use ui::BusUiGateway;
