//! # Wallet Runtime Library
//!
//! This library exposes the internal modules of the wallet runtime for
//! testing. The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `cli` - Command line flags and launcher keywords
//! - `container/` - Runtime configuration and the long-lived infrastructure
//! - `bridge` - JSON-lines stdio transport to the UI process
//! - `wiring` - Frame routing and the reload loop

#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod cli;
pub mod container;
pub mod wiring;

pub use cli::Args;
pub use container::{RuntimeConfig, RuntimeSupervisor, WalletContainer};
pub use wiring::{route_frame, run_sessions};
