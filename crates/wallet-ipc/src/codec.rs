//! # Line Codec
//!
//! One JSON object per line. Catalogue messages travel as-is; the transport
//! adds two control frames that are not part of the catalogue:
//!
//! - inbound `{"kind":"ui-ready"}`: the UI finished loading
//! - outbound `{"kind":"reload"}`: the UI must fully reload

use crate::messages::{SupervisorMessage, UiCommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from encoding or decoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The line held no JSON object.
    #[error("empty frame")]
    Empty,

    /// The line was not a known frame.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Transport notifications from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InboundControl {
    UiReady,
}

/// Transport instructions to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutboundControl {
    Reload,
}

/// Anything the UI may write to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    Command(UiCommand),
    Control(InboundControl),
}

/// Anything the supervisor may write to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Message(SupervisorMessage),
    Control(OutboundControl),
}

impl From<SupervisorMessage> for OutboundFrame {
    fn from(message: SupervisorMessage) -> Self {
        Self::Message(message)
    }
}

/// Decode one line written by the UI.
pub fn decode_inbound(line: &str) -> Result<InboundFrame, CodecError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Decode one line written by the supervisor.
pub fn decode_outbound(line: &str) -> Result<OutboundFrame, CodecError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Encode a frame for the UI, without the trailing newline.
pub fn encode_outbound(frame: &OutboundFrame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}
