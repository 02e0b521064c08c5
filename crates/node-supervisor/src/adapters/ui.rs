//! UI gateway over the in-process bus

use crate::ports::UiGateway;
use std::sync::Arc;
use tracing::debug;
use wallet_ipc::{InMemoryUiBus, OutboundControl, OutboundFrame, SupervisorMessage, UiPublisher};

/// Publishes supervisor messages on the UI bus
#[derive(Clone)]
pub struct BusUiGateway {
    bus: Arc<InMemoryUiBus>,
}

impl BusUiGateway {
    pub fn new(bus: Arc<InMemoryUiBus>) -> Self {
        Self { bus }
    }
}

impl UiGateway for BusUiGateway {
    fn send(&self, message: SupervisorMessage) {
        self.bus.publish(message.into());
    }

    fn request_reload(&self) {
        debug!("Requesting UI reload");
        self.bus.publish(OutboundFrame::Control(OutboundControl::Reload));
    }
}
