//! # Stdio Bridge
//!
//! The UI process talks to the runtime with one JSON frame per line:
//! commands arrive on stdin, supervisor messages leave on stdout.
//!
//! ```text
//! UI ──stdin──→ [reader] ──mpsc──→ reload loop ──→ SupervisorHandle
//! UI ←─stdout── [writer] ←──────── InMemoryUiBus ←── BusUiGateway
//! ```

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use wallet_ipc::{decode_inbound, encode_outbound, InboundFrame, UiSubscription};
use wallet_telemetry::{UI_FRAMES_REJECTED, UI_FRAMES_WRITTEN};

/// Read frames until EOF. Undecodable lines are logged and skipped.
///
/// Returns the number of frames forwarded.
pub fn spawn_reader<R>(reader: R, tx: mpsc::UnboundedSender<InboundFrame>) -> JoinHandle<io::Result<u64>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut forwarded = 0u64;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match decode_inbound(&line) {
                Ok(frame) => {
                    debug!(?frame, "UI frame received");
                    if tx.send(frame).is_err() {
                        break;
                    }
                    forwarded += 1;
                }
                Err(e) => {
                    UI_FRAMES_REJECTED.inc();
                    warn!(error = %e, line = %line, "Rejected UI frame");
                }
            }
        }
        debug!(forwarded, "UI input closed");
        Ok(forwarded)
    })
}

/// Write every published frame until the bus is dropped.
///
/// Returns the number of frames written.
pub fn spawn_writer<W>(mut frames: UiSubscription, mut writer: W) -> JoinHandle<io::Result<u64>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut written = 0u64;
        while let Some(frame) = frames.recv().await {
            let line = match encode_outbound(&frame) {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "Failed to encode UI frame");
                    continue;
                }
            };
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            UI_FRAMES_WRITTEN.inc();
            written += 1;
        }
        Ok(written)
    })
}
