//! Node argument vector

use crate::domain::config::NodeConfig;

/// Build the node's argument vector.
///
/// ```text
/// [--wipe [full]] [--miner] --chain <net> [--api 127.0.0.1:<port>]
/// ```
///
/// A full wipe takes precedence over a plain one.
pub fn build_args(config: &NodeConfig, api_port: Option<u16>) -> Vec<String> {
    let mut args = Vec::with_capacity(7);

    if config.wipe_full {
        args.push("--wipe".to_string());
        args.push("full".to_string());
    } else if config.wipe {
        args.push("--wipe".to_string());
    }

    if config.is_mining {
        args.push("--miner".to_string());
    }

    args.push("--chain".to_string());
    args.push(config.net.as_str().to_string());

    if let Some(port) = api_port {
        args.push("--api".to_string());
        args.push(format!("127.0.0.1:{port}"));
    }

    args
}
