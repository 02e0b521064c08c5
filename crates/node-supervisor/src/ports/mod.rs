//! Ports layer (Hexagonal Architecture)

pub mod outbound;

pub use outbound::{
    DiagnosticPresenter, LaunchSpec, LifecycleHooks, NodeProcess, ProcessLauncher, SettingsStore,
    UiGateway,
};
