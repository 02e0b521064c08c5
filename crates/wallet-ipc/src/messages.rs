//! # Message Catalogue
//!
//! Every message that may cross the UI ⇄ supervisor boundary. The set is
//! closed: adding a kind is a protocol change.

use crate::payload::ConfigPatch;
use serde::{Deserialize, Deserializer, Serialize};

/// Commands sent by the UI to the supervisor.
///
/// A `restart` or `shutdown` without a payload carries an empty patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum UiCommand {
    /// One-shot question: did this session start with a mandatory wipe?
    AskWipeStatus,
    /// Launch the node if nothing is running.
    Start,
    /// Merge the patch and relaunch the node.
    Restart(ConfigPatch),
    /// Merge the patch and ask the node to stop.
    Shutdown(ConfigPatch),
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
enum WireCommandKind {
    AskWipeStatus,
    Start,
    Restart,
    Shutdown,
}

/// Inbound command as written on the wire, payload optional.
#[derive(Deserialize)]
struct WireCommand {
    kind: WireCommandKind,
    #[serde(default)]
    payload: Option<ConfigPatch>,
}

impl From<WireCommand> for UiCommand {
    fn from(wire: WireCommand) -> Self {
        match wire.kind {
            WireCommandKind::AskWipeStatus => Self::AskWipeStatus,
            WireCommandKind::Start => Self::Start,
            WireCommandKind::Restart => Self::Restart(wire.payload.unwrap_or_default()),
            WireCommandKind::Shutdown => Self::Shutdown(wire.payload.unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for UiCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireCommand::deserialize(deserializer).map(Self::from)
    }
}

/// Messages sent by the supervisor to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum SupervisorMessage {
    /// Answer to `ask-wipe-status`.
    WipeStatusAnswer(bool),
    /// One chunk of node standard output.
    Log(String),
    /// The node crashed; carries the buffered log snapshot.
    FatalExit(Vec<String>),
}

/// Flat list of message kinds, for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    AskWipeStatus,
    Start,
    Restart,
    Shutdown,
    WipeStatusAnswer,
    Log,
    FatalExit,
}

impl MessageKind {
    /// Wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AskWipeStatus => "ask-wipe-status",
            Self::Start => "start",
            Self::Restart => "restart",
            Self::Shutdown => "shutdown",
            Self::WipeStatusAnswer => "wipe-status-answer",
            Self::Log => "log",
            Self::FatalExit => "fatal-exit",
        }
    }
}

impl UiCommand {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::AskWipeStatus => MessageKind::AskWipeStatus,
            Self::Start => MessageKind::Start,
            Self::Restart(_) => MessageKind::Restart,
            Self::Shutdown(_) => MessageKind::Shutdown,
        }
    }
}

impl SupervisorMessage {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::WipeStatusAnswer(_) => MessageKind::WipeStatusAnswer,
            Self::Log(_) => MessageKind::Log,
            Self::FatalExit(_) => MessageKind::FatalExit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Chain;

    #[test]
    fn test_command_kinds() {
        let kinds: Vec<_> = [
            UiCommand::AskWipeStatus,
            UiCommand::Start,
            UiCommand::Restart(ConfigPatch::default()),
            UiCommand::Shutdown(ConfigPatch::default()),
        ]
        .iter()
        .map(|command| command.kind().as_str())
        .collect();
        assert_eq!(kinds, ["ask-wipe-status", "start", "restart", "shutdown"]);
    }

    #[test]
    fn test_commands_without_payload_carry_empty_patch() {
        let shutdown: UiCommand = serde_json::from_str(r#"{"kind":"shutdown"}"#).unwrap();
        assert_eq!(shutdown, UiCommand::Shutdown(ConfigPatch::default()));

        let restart: UiCommand =
            serde_json::from_str(r#"{"kind":"restart","payload":null}"#).unwrap();
        assert_eq!(restart, UiCommand::Restart(ConfigPatch::default()));
    }

    #[test]
    fn test_unknown_command_kind_rejected() {
        assert!(serde_json::from_str::<UiCommand>(r#"{"kind":"log","payload":"x"}"#).is_err());
    }

    #[test]
    fn test_restart_wire_shape() {
        let command = UiCommand::Restart(ConfigPatch::chain(Chain::Test));
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "restart", "payload": {"net": "test"}})
        );
    }

    #[test]
    fn test_unit_command_without_payload() {
        let command: UiCommand = serde_json::from_str(r#"{"kind":"ask-wipe-status"}"#).unwrap();
        assert_eq!(command, UiCommand::AskWipeStatus);
    }

    #[test]
    fn test_fatal_exit_wire_shape() {
        let message = SupervisorMessage::FatalExit(vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "fatal-exit", "payload": ["a", "b"]})
        );
        assert_eq!(message.kind().as_str(), "fatal-exit");
    }
}
