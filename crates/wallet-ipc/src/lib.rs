//! # Wallet IPC - UI ⇄ Supervisor Message Protocol
//!
//! Defines the fixed catalogue of messages exchanged between the wallet UI
//! process and the node supervisor, plus the in-process plumbing that carries
//! them.
//!
//! ## Catalogue
//!
//! | Direction | Kind | Payload |
//! |-----------|------|---------|
//! | UI → Supervisor | `ask-wipe-status` | none (answered once) |
//! | UI → Supervisor | `start` | none |
//! | UI → Supervisor | `restart` | partial config |
//! | UI → Supervisor | `shutdown` | partial config |
//! | Supervisor → UI | `wipe-status-answer` | bool |
//! | Supervisor → UI | `log` | one output chunk |
//! | Supervisor → UI | `fatal-exit` | buffered log lines |
//!
//! ## Delivery
//!
//! ```text
//! ┌────────────┐  dispatch()   ┌───────────────┐  publish()  ┌──────────┐
//! │ Supervisor │ ────────────→ │ OutboundQueue │ ──────────→ │  UI Bus  │ ──→ UI
//! └────────────┘               └───────────────┘  (ready)    └──────────┘
//! ```
//!
//! Delivery is fire-and-forget. The outbound queue only exists to survive the
//! startup race where the node launches before the UI can receive anything.
//! Each bus subscriber reads from its own unbounded queue, so a slow reader
//! never drops a frame.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod codec;
pub mod messages;
pub mod payload;
pub mod publisher;
pub mod queue;
pub mod subscriber;

// Re-export main types
pub use codec::{
    decode_inbound, decode_outbound, encode_outbound, CodecError, InboundControl, InboundFrame,
    OutboundControl, OutboundFrame,
};
pub use messages::{MessageKind, SupervisorMessage, UiCommand};
pub use payload::{Chain, ConfigPatch};
pub use publisher::{InMemoryUiBus, UiPublisher};
pub use queue::{Delivery, OutboundQueue};
pub use subscriber::UiSubscription;
