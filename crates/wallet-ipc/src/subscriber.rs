//! # UI Subscriber
//!
//! Defines the receiving side of the supervisor → UI channel.

use crate::codec::OutboundFrame;
use tokio::sync::mpsc;

/// A subscription handle for receiving frames.
pub struct UiSubscription {
    receiver: mpsc::UnboundedReceiver<OutboundFrame>,
}

impl UiSubscription {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<OutboundFrame>) -> Self {
        Self { receiver }
    }

    /// Receive the next frame.
    ///
    /// # Returns
    ///
    /// - `Some(frame)` - The next frame
    /// - `None` - The bus was dropped and everything was read
    pub async fn recv(&mut self) -> Option<OutboundFrame> {
        self.receiver.recv().await
    }

    /// Next buffered frame, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<OutboundFrame> {
        self.receiver.try_recv().ok()
    }

    /// Drain every frame currently buffered.
    pub fn drain(&mut self) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SupervisorMessage;
    use crate::publisher::{InMemoryUiBus, UiPublisher};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryUiBus::new();
        let mut sub = bus.subscribe();

        bus.publish(SupervisorMessage::Log("hello".into()).into());

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("frame");

        assert_eq!(
            received,
            OutboundFrame::Message(SupervisorMessage::Log("hello".into()))
        );
    }

    #[tokio::test]
    async fn test_buffered_frames_survive_bus_drop() {
        let bus = InMemoryUiBus::new();
        let mut sub = bus.subscribe();
        bus.publish(SupervisorMessage::WipeStatusAnswer(false).into());
        drop(bus);

        assert_eq!(
            sub.recv().await,
            Some(OutboundFrame::Message(SupervisorMessage::WipeStatusAnswer(false)))
        );
        assert!(sub.recv().await.is_none());
    }

    #[test]
    fn test_try_recv_empty() {
        let bus = InMemoryUiBus::new();
        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_drain_preserves_order() {
        let bus = InMemoryUiBus::new();
        let mut sub = bus.subscribe();

        for i in 0..3 {
            bus.publish(SupervisorMessage::Log(format!("line {i}")).into());
        }

        let lines: Vec<_> = sub
            .drain()
            .into_iter()
            .map(|frame| match frame {
                OutboundFrame::Message(SupervisorMessage::Log(line)) => line,
                other => panic!("unexpected frame {other:?}"),
            })
            .collect();
        assert_eq!(lines, vec!["line 0", "line 1", "line 2"]);
    }
}
