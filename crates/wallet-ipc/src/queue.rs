//! # Outbound Queue
//!
//! Holds supervisor messages until the UI reports that it finished loading.
//!
//! ```text
//! [BUFFERING] ──mark_ready()──→ drain in FIFO order ──→ [PASS-THROUGH]
//! ```
//!
//! The buffer is drained exactly once and discarded; afterwards every
//! dispatch is delivered immediately.

use crate::messages::SupervisorMessage;

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the sender right away.
    Sent,
    /// Parked until the UI is ready.
    Queued,
}

/// Startup-race buffer for outbound messages.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    /// `Some` while the UI is not ready; `None` once drained.
    pending: Option<Vec<SupervisorMessage>>,
}

impl OutboundQueue {
    /// Create an empty queue in buffering mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Some(Vec::new()),
        }
    }

    /// Whether the UI has signalled readiness.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of messages waiting for the UI.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    /// Send immediately when ready, otherwise buffer.
    pub fn dispatch<F>(&mut self, message: SupervisorMessage, mut send: F) -> Delivery
    where
        F: FnMut(SupervisorMessage),
    {
        match self.pending.as_mut() {
            Some(buffer) => {
                buffer.push(message);
                Delivery::Queued
            }
            None => {
                send(message);
                Delivery::Sent
            }
        }
    }

    /// Switch to pass-through and flush the buffer in enqueue order.
    ///
    /// Returns the number of flushed messages; a second call flushes nothing.
    pub fn mark_ready<F>(&mut self, mut send: F) -> usize
    where
        F: FnMut(SupervisorMessage),
    {
        let Some(buffer) = self.pending.take() else {
            return 0;
        };
        let flushed = buffer.len();
        for message in buffer {
            send(message);
        }
        flushed
    }
}
