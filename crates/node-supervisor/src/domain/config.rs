//! Launch configuration and its resolution
//!
//! The initial [`NodeConfig`] is computed once from three inputs:
//!
//! ```text
//! LaunchOverrides (env + CLI) ──┐
//! PersistedSettings (store) ────┼──→ ConfigResolver ──→ ResolvedLaunch
//! VersionGate ──────────────────┘
//! ```
//!
//! Afterwards it only changes by merging partial updates carried by
//! `restart` and `shutdown` commands.

use crate::domain::version_gate::VersionGate;
use std::env;
use tracing::debug;
use wallet_ipc::{Chain, ConfigPatch};

/// Effective node launch configuration
///
/// `wipe` and `wipe_full` are consumed by the next successful launch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeConfig {
    pub wipe: bool,
    pub wipe_full: bool,
    pub is_mining: bool,
    pub net: Chain,
}

impl NodeConfig {
    /// Overwrite every field present in the patch.
    pub fn merge(&mut self, patch: &ConfigPatch) {
        if let Some(wipe) = patch.wipe {
            self.wipe = wipe;
        }
        if let Some(wipe_full) = patch.wipe_full {
            self.wipe_full = wipe_full;
        }
        if let Some(is_mining) = patch.is_mining {
            self.is_mining = is_mining;
        }
        if let Some(net) = patch.net {
            self.net = net;
        }
    }

    /// Whether the next launch performs any wipe.
    pub fn needs_wipe(&self) -> bool {
        self.wipe || self.wipe_full
    }

    pub fn clear_wipe_flags(&mut self) {
        self.wipe = false;
        self.wipe_full = false;
    }
}

/// Operator overrides from the environment and the command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub force_wipe: bool,
    pub force_wipe_full: bool,
    pub force_mining: bool,
    pub local_net: bool,
    pub test_net: bool,
    pub api_port: Option<u16>,
}

impl LaunchOverrides {
    pub const ENV_WIPE: &'static str = "WALLET_WIPE";
    pub const ENV_WIPE_FULL: &'static str = "WALLET_WIPE_FULL";
    pub const ENV_MINER: &'static str = "WALLET_MINER";
    pub const ENV_LOCAL_NET: &'static str = "WALLET_LOCAL_NET";
    pub const ENV_TEST_NET: &'static str = "WALLET_TEST_NET";
    pub const ENV_API_PORT: &'static str = "WALLET_NODE_API_PORT";

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));
        Self {
            force_wipe: flag(Self::ENV_WIPE),
            force_wipe_full: flag(Self::ENV_WIPE_FULL),
            force_mining: flag(Self::ENV_MINER),
            local_net: flag(Self::ENV_LOCAL_NET),
            test_net: flag(Self::ENV_TEST_NET),
            api_port: lookup(Self::ENV_API_PORT).and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Combine two sources; flags are OR-ed and `other`'s port wins.
    #[must_use]
    pub fn merge(self, other: LaunchOverrides) -> Self {
        Self {
            force_wipe: self.force_wipe || other.force_wipe,
            force_wipe_full: self.force_wipe_full || other.force_wipe_full,
            force_mining: self.force_mining || other.force_mining,
            local_net: self.local_net || other.local_net,
            test_net: self.test_net || other.test_net,
            api_port: other.api_port.or(self.api_port),
        }
    }
}

/// A flag is on when set to anything but empty, `0` or `false`.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Values read from the persisted store at startup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedSettings {
    /// Raw chain selection, validated leniently
    pub chain: Option<String>,
    pub mining_enabled: bool,
    /// Node version recorded by the last wipe
    pub last_wiped_node_version: Option<String>,
}

/// Output of the resolver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLaunch {
    pub config: NodeConfig,
    /// Version gate verdict, fixed for the supervisor's lifetime
    pub wipe_required: bool,
    pub api_port: Option<u16>,
}

/// Computes the initial launch configuration
pub struct ConfigResolver {
    overrides: LaunchOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: LaunchOverrides) -> Self {
        Self { overrides }
    }

    /// Resolve the configuration. Never fails; malformed persisted values
    /// count as absent.
    pub fn resolve(&self, persisted: &PersistedSettings) -> ResolvedLaunch {
        let net = self.resolve_net(persisted);

        let is_mining = match net {
            Chain::Main => false,
            Chain::Test | Chain::Local => self.overrides.force_mining || persisted.mining_enabled,
        };

        let wipe_required =
            VersionGate::is_wipe_required(net, persisted.last_wiped_node_version.as_deref());

        let config = NodeConfig {
            wipe: self.overrides.force_wipe || wipe_required,
            wipe_full: self.overrides.force_wipe_full,
            is_mining,
            net,
        };

        debug!(?config, wipe_required, "Resolved node launch configuration");

        ResolvedLaunch {
            config,
            wipe_required,
            api_port: self.overrides.api_port,
        }
    }

    fn resolve_net(&self, persisted: &PersistedSettings) -> Chain {
        if let Some(chain) = persisted.chain.as_deref().and_then(Chain::parse_lenient) {
            return chain;
        }
        if self.overrides.local_net {
            Chain::Local
        } else if self.overrides.test_net {
            Chain::Test
        } else {
            Chain::Main
        }
    }
}
