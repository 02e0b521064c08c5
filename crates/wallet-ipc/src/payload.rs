//! # Wire Payloads
//!
//! Value types carried inside IPC messages and shared with the supervisor
//! domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target blockchain network for the node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Production network.
    #[default]
    Main,
    /// Public test network.
    Test,
    /// Local development network.
    Local,
}

impl Chain {
    /// Value passed to the node after `--chain`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
            Self::Local => "local",
        }
    }

    /// Lenient parse used for persisted values.
    ///
    /// Accepts the short and long spellings in any case; anything else is
    /// `None`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Some(Self::Main),
            "test" | "testnet" => Some(Self::Test),
            "local" | "localnet" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a chain name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chain: {0}")]
pub struct UnknownChain(pub String);

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| UnknownChain(s.to_string()))
    }
}

/// Partial launch configuration sent with `restart` and `shutdown`.
///
/// Absent fields leave the current value untouched when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wipe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wipe_full: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mining: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<Chain>,
}

impl ConfigPatch {
    /// Patch that only switches the chain.
    #[must_use]
    pub fn chain(net: Chain) -> Self {
        Self {
            net: Some(net),
            ..Self::default()
        }
    }

    /// Patch that only toggles mining.
    #[must_use]
    pub fn mining(enabled: bool) -> Self {
        Self {
            is_mining: Some(enabled),
            ..Self::default()
        }
    }
}
