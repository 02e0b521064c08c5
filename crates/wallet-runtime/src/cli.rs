//! Command line surface of the runtime.

use clap::{Parser, ValueEnum};
use node_supervisor::LaunchOverrides;
use std::path::PathBuf;

/// Bare keywords accepted after the flags, as older launchers pass them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LaunchKeyword {
    Wipe,
    Wipefull,
    Miner,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Run the wallet shell and supervise the local node", long_about = None)]
pub struct Args {
    /// Wipe the node database on the first launch
    #[arg(long)]
    pub wipe: bool,

    /// Wipe the node database and everything it downloaded
    #[arg(long)]
    pub wipe_full: bool,

    /// Enable mining (ignored on main)
    #[arg(long)]
    pub miner: bool,

    /// Expose the node API on 127.0.0.1:<port>
    #[arg(long, value_name = "PORT")]
    pub api_port: Option<u16>,

    /// Node executable
    #[arg(long, value_name = "PATH")]
    pub node_bin: Option<PathBuf>,

    /// Working directory for the node
    #[arg(long, value_name = "DIR")]
    pub node_dir: Option<PathBuf>,

    /// Directory holding settings.json
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Version of the bundled node, recorded when wiping
    #[arg(long, value_name = "VERSION")]
    pub node_version: Option<String>,

    #[arg(value_enum, hide = true)]
    pub keywords: Vec<LaunchKeyword>,
}

impl Args {
    fn has_keyword(&self, keyword: LaunchKeyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Overrides given on the command line.
    pub fn overrides(&self) -> LaunchOverrides {
        LaunchOverrides {
            force_wipe: self.wipe || self.has_keyword(LaunchKeyword::Wipe),
            force_wipe_full: self.wipe_full || self.has_keyword(LaunchKeyword::Wipefull),
            force_mining: self.miner || self.has_keyword(LaunchKeyword::Miner),
            local_net: false,
            test_net: false,
            api_port: self.api_port,
        }
    }
}
