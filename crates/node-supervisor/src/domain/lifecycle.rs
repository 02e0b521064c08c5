//! Supervisor lifecycle and exit classification
//!
//! State Machine:
//! ```text
//! [IDLE] ──init()──→ [LAUNCHING] ──spawned──→ [RUNNING] ──exit code 1──→ [CRASHED]
//!                         │                    │  │  │
//!                         │                    │  │  └── other exit ──→ [CLOSED NORMALLY]
//!                         │                    │  │
//!                         │                    │  └── shutdown ──→ [SHUTTING DOWN] ──exit──→ ...
//!                         │                    │
//!                         │                    └── restart ──→ [RESTARTING] ──→ init() | [RELOADING]
//!                         │
//!                         └── spawn error / runtime error ──→ [FAILED]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supervisor lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SupervisorState {
    /// Constructed, nothing launched yet
    #[default]
    Idle,
    /// Spawn in progress
    Launching,
    /// A live node process is owned
    Running,
    /// Restart signal sent, relaunch follows
    Restarting,
    /// Restart signal sent with a chain change; waiting for the exit before
    /// the application rebuilds the supervisor
    Reloading,
    /// Shutdown signal sent, waiting for exit
    ShuttingDown,
    /// Node exited with code 1
    Crashed,
    /// Node exited for any other reason
    ClosedNormally,
    /// Spawn or process runtime error
    Failed,
}

impl SupervisorState {
    /// Whether no further launches happen from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Crashed | Self::ClosedNormally | Self::Failed)
    }
}

/// Signals the supervisor sends to the node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeSignal {
    /// Abrupt kill ahead of a relaunch
    Restart,
    /// Cooperative stop, never escalated
    Shutdown,
}

impl NodeSignal {
    /// POSIX signal number
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Restart => 9,
            Self::Shutdown => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Restart => "SIGKILL",
            Self::Shutdown => "SIGINT",
        }
    }
}

impl fmt::Display for NodeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exit code that marks a node crash
pub const CRASH_EXIT_CODE: i32 = 1;

/// How a node exit is treated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExitClass {
    /// Killed with the restart signal; logged only
    IntentionalRestart,
    /// Exit code 1; fatal
    Crash,
    /// Anything else
    NormalClose,
}

impl ExitClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntentionalRestart => "intentional_restart",
            Self::Crash => "crash",
            Self::NormalClose => "normal_close",
        }
    }
}

/// Classify an exit. The restart signal takes priority over the exit code.
pub fn classify_exit(code: Option<i32>, signal: Option<i32>) -> ExitClass {
    if signal == Some(NodeSignal::Restart.as_raw()) {
        ExitClass::IntentionalRestart
    } else if code == Some(CRASH_EXIT_CODE) {
        ExitClass::Crash
    } else {
        ExitClass::NormalClose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_signal_wins() {
        assert_eq!(classify_exit(Some(1), Some(9)), ExitClass::IntentionalRestart);
        assert_eq!(classify_exit(None, Some(9)), ExitClass::IntentionalRestart);
    }

    #[test]
    fn test_code_one_is_crash() {
        assert_eq!(classify_exit(Some(1), None), ExitClass::Crash);
        assert_eq!(classify_exit(Some(1), Some(2)), ExitClass::Crash);
    }

    #[test]
    fn test_everything_else_is_normal() {
        assert_eq!(classify_exit(Some(0), None), ExitClass::NormalClose);
        assert_eq!(classify_exit(Some(2), None), ExitClass::NormalClose);
        assert_eq!(classify_exit(None, Some(2)), ExitClass::NormalClose);
        assert_eq!(classify_exit(None, None), ExitClass::NormalClose);
    }

    #[test]
    fn test_signal_numbers() {
        assert_eq!(NodeSignal::Restart.as_raw(), 9);
        assert_eq!(NodeSignal::Shutdown.as_raw(), 2);
        assert_eq!(NodeSignal::Shutdown.to_string(), "SIGINT");
    }

    #[test]
    fn test_terminal_states() {
        assert!(SupervisorState::Crashed.is_terminal());
        assert!(SupervisorState::Failed.is_terminal());
        assert!(SupervisorState::ClosedNormally.is_terminal());
        assert!(!SupervisorState::Reloading.is_terminal());
        assert!(!SupervisorState::Running.is_terminal());
    }
}
