//! # Runtime Configuration
//!
//! Where the node binary, its working directory and the settings file live,
//! plus the versions recorded by wipes.
//!
//! ## Precedence
//!
//! | Setting | Order |
//! |---------|-------|
//! | node binary | `--node-bin` > `WALLET_NODE_BIN` > `<exe dir>/node/full-node` |
//! | working dir | `--node-dir` > parent of the node binary |
//! | data dir | `--data-dir` > `WALLET_DATA_DIR` > `~/.wallet-shell` |
//! | node version | `--node-version` > `WALLET_NODE_VERSION` > bundled |

use crate::cli::Args;
use node_supervisor::{LaunchOverrides, SupervisorOptions, DEFAULT_NODE_VERSION};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_NODE_BIN: &str = "WALLET_NODE_BIN";
pub const ENV_DATA_DIR: &str = "WALLET_DATA_DIR";
pub const ENV_NODE_VERSION: &str = "WALLET_NODE_VERSION";

/// Installed layout: the node ships next to the runtime executable.
const BUNDLED_NODE_PATH: [&str; 2] = ["node", "full-node"];
const DATA_DIR_NAME: &str = ".wallet-shell";
const SETTINGS_FILE: &str = "settings.json";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub node_bin: PathBuf,
    pub node_dir: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub wallet_version: String,
    pub node_version: String,
    /// Environment overrides merged with the command line
    pub overrides: LaunchOverrides,
}

impl RuntimeConfig {
    /// Resolve from the command line and the process environment.
    pub fn from_args(args: &Args) -> Self {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::resolve(args, |key| env::var(key).ok(), &exe_dir)
    }

    /// Resolve through an arbitrary variable lookup.
    pub fn resolve<F>(args: &Args, lookup: F, exe_dir: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_bin = args
            .node_bin
            .clone()
            .or_else(|| non_empty(&lookup, ENV_NODE_BIN).map(PathBuf::from))
            .unwrap_or_else(|| BUNDLED_NODE_PATH.iter().fold(exe_dir.to_path_buf(), |p, s| p.join(s)));

        let node_dir = args
            .node_dir
            .clone()
            .or_else(|| node_bin.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf));

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| non_empty(&lookup, ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(|| home_dir(&lookup).join(DATA_DIR_NAME));

        let node_version = args
            .node_version
            .clone()
            .or_else(|| non_empty(&lookup, ENV_NODE_VERSION))
            .unwrap_or_else(|| DEFAULT_NODE_VERSION.to_string());

        Self {
            node_bin,
            node_dir,
            data_dir,
            wallet_version: env!("CARGO_PKG_VERSION").to_string(),
            node_version,
            overrides: LaunchOverrides::from_lookup(&lookup).merge(args.overrides()),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Options handed to every supervisor built from this configuration.
    pub fn supervisor_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            program: self.node_bin.clone(),
            working_dir: self.node_dir.clone(),
            wallet_version: self.wallet_version.clone(),
            node_version: self.node_version.clone(),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn home_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, "HOME")
        .or_else(|| non_empty(lookup, "USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
