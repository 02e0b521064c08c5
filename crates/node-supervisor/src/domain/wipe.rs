//! Persisted record of the last data wipe

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Written once per actual wipe, read back only by the version gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeRecord {
    /// Unix time in milliseconds
    pub timestamp: i64,
    pub wallet_version: String,
    pub node_version: String,
}

impl WipeRecord {
    /// Record stamped with the current time.
    pub fn now(wallet_version: impl Into<String>, node_version: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            wallet_version: wallet_version.into(),
            node_version: node_version.into(),
        }
    }
}
