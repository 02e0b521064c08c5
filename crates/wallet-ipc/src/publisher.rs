//! # UI Publisher
//!
//! Defines the publishing side of the supervisor → UI channel.

use crate::codec::OutboundFrame;
use crate::subscriber::UiSubscription;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trait for pushing frames towards the UI.
///
/// Publishing never blocks and never fails: a frame with no listener is
/// dropped.
pub trait UiPublisher: Send + Sync {
    /// Publish a frame.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the frame.
    fn publish(&self, frame: OutboundFrame) -> usize;
}

/// In-memory implementation of the UI bus.
///
/// Every subscriber owns an unbounded queue, so a slow reader (the stdout
/// writer behind a chatty node) falls behind but never loses a frame.
#[derive(Default)]
pub struct InMemoryUiBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<OutboundFrame>>>,
}

impl InMemoryUiBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every frame published from now on.
    #[must_use]
    pub fn subscribe(&self) -> UiSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        debug!("New UI subscription created");
        UiSubscription::new(rx)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl UiPublisher for InMemoryUiBus {
    fn publish(&self, frame: OutboundFrame) -> usize {
        let kind = match &frame {
            OutboundFrame::Message(message) => message.kind().as_str(),
            OutboundFrame::Control(_) => "control",
        };

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(frame.clone()).is_ok());
        let receivers = subscribers.len();

        if receivers == 0 {
            warn!(kind, "Frame dropped (no UI listener)");
        } else {
            debug!(kind, receivers, "Frame published");
        }
        receivers
    }
}
