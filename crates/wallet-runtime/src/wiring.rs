//! # Session Wiring
//!
//! Routes UI frames and the quit request into the current supervisor and
//! builds a new supervisor every time the UI reloads.
//!
//! Once a supervisor has asked for a reload, further frames come from the
//! reloaded UI. They are held back and replayed, in order, into the next
//! supervisor.
//!
//! ```text
//!            ┌──────────── Reload ────────────┐
//!            ↓                                │
//! container.supervisor() ──→ run() ──→ SupervisorExit
//!            ↑                 ↑
//!       settings.json     UI frames, quit
//! ```

use crate::container::WalletContainer;
use node_supervisor::{SupervisorExit, SupervisorHandle};
use std::collections::VecDeque;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info};
use wallet_ipc::{InboundControl, InboundFrame};

/// Hand one UI frame to the supervisor.
pub fn route_frame(handle: &SupervisorHandle, frame: InboundFrame) -> bool {
    match frame {
        InboundFrame::Command(command) => handle.command(command),
        InboundFrame::Control(InboundControl::UiReady) => handle.ui_ready(),
    }
}

/// Run supervisors until one finishes for a reason other than a reload.
///
/// `shutdown` resolving, or the UI input closing, quits the application:
/// the live node gets the shutdown signal and no further supervisor is
/// built.
pub async fn run_sessions<S>(
    container: &WalletContainer,
    inbound: &mut mpsc::UnboundedReceiver<InboundFrame>,
    shutdown: S,
) -> SupervisorExit
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut quitting = false;
    let mut ui_open = true;
    let mut sessions = 0u64;
    let mut held: VecDeque<InboundFrame> = VecDeque::new();

    loop {
        let supervisor = container.supervisor();
        let handle = supervisor.handle();
        sessions += 1;
        debug!(sessions, session = %supervisor.session(), "Supervisor session starting");

        if !held.is_empty() {
            debug!(frames = held.len(), "Replaying frames held during reload");
        }
        for frame in held.drain(..) {
            route_frame(&handle, frame);
        }

        let run = supervisor.run();
        tokio::pin!(run);

        let exit = loop {
            tokio::select! {
                exit = &mut run => break exit,
                frame = inbound.recv(), if ui_open => match frame {
                    Some(frame) if handle.reload_requested() => {
                        debug!("Holding frame for the next supervisor");
                        held.push_back(frame);
                    }
                    Some(frame) => {
                        route_frame(&handle, frame);
                    }
                    None => {
                        ui_open = false;
                        if !quitting {
                            info!("UI input closed, quitting");
                            quitting = true;
                            handle.quit();
                        }
                    }
                },
                _ = &mut shutdown, if !quitting => {
                    info!("Shutdown requested");
                    quitting = true;
                    handle.quit();
                }
            }
        };

        match exit {
            SupervisorExit::Reload if !quitting => {
                info!(sessions, "UI reloading, rebuilding supervisor");
            }
            SupervisorExit::Reload => return SupervisorExit::Closed,
            other => return other,
        }
    }
}
