//! CLI surface built with a `clap::Command` builder. RPC/P2P listen flags
//! are dropped — those surfaces are out of scope — leaving a network
//! selector, a data directory, logging controls, and the regtest-only
//! window overrides the auction end-to-end scenario needs when driven
//! from the CLI.

use clap::{arg, Arg, Command};
use hnsd_consensus_core::network::NetworkType;
use hnsd_consensus_core::config::params::NetworkParams;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub network: NetworkType,
    pub appdir: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,

    // Regtest-only window overrides; ignored
    // on every other network.
    pub tree_interval: Option<u32>,
    pub bidding_period: Option<u32>,
    pub reveal_period: Option<u32>,
    pub transfer_lockup: Option<u32>,
    pub renewal_window: Option<u32>,
    pub revocation_delay: Option<u32>,
}

pub fn cli() -> Command {
    Command::new("hnsd")
        .about(format!("{} v{}", env!("CARGO_PKG_DESCRIPTION"), env!("CARGO_PKG_VERSION")))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("network")
                .long("network")
                .value_name("main|test|regtest|simnet")
                .default_value("main")
                .num_args(0..=1)
                .require_equals(true)
                .help("Network to connect to."),
        )
        .arg(arg!(-b --appdir <DATA_DIR> "Directory to store data."))
        .arg(
            Arg::new("log_level")
                .short('d')
                .long("loglevel")
                .value_name("log_level")
                .default_value("info")
                .num_args(0..=1)
                .require_equals(true)
                .help("Specify log level."),
        )
        .arg(Arg::new("log_dir").long("logdir").value_name("log_dir").num_args(0..=1).require_equals(true).help("Directory to log output to (default: stdout only)."))
        .arg(
            Arg::new("tree_interval")
                .long("tree-interval")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the trie-commit interval (regtest only)."),
        )
        .arg(
            Arg::new("bidding_period")
                .long("bidding-period")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the BIDDING window length (regtest only)."),
        )
        .arg(
            Arg::new("reveal_period")
                .long("reveal-period")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the REVEAL window length (regtest only)."),
        )
        .arg(
            Arg::new("transfer_lockup")
                .long("transfer-lockup")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the minimum TRANSFER age before FINALIZE (regtest only)."),
        )
        .arg(
            Arg::new("renewal_window")
                .long("renewal-window")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the renewal-expiry window (regtest only)."),
        )
        .arg(
            Arg::new("revocation_delay")
                .long("revocation-delay")
                .value_name("blocks")
                .num_args(0..=1)
                .require_equals(true)
                .help("Override the post-REVOKE unopenable window (regtest only)."),
        )
}

impl Args {
    pub fn parse() -> Args {
        let m = cli().get_matches();
        Args {
            network: m.get_one::<String>("network").cloned().unwrap().parse().expect("clap value_parser restricts to known networks"),
            appdir: m.get_one::<String>("appdir").cloned(),
            log_level: m.get_one::<String>("log_level").cloned().unwrap(),
            log_dir: m.get_one::<String>("log_dir").cloned(),
            tree_interval: m.get_one::<String>("tree_interval").map(|s| s.parse().expect("blocks is a number")),
            bidding_period: m.get_one::<String>("bidding_period").map(|s| s.parse().expect("blocks is a number")),
            reveal_period: m.get_one::<String>("reveal_period").map(|s| s.parse().expect("blocks is a number")),
            transfer_lockup: m.get_one::<String>("transfer_lockup").map(|s| s.parse().expect("blocks is a number")),
            renewal_window: m.get_one::<String>("renewal_window").map(|s| s.parse().expect("blocks is a number")),
            revocation_delay: m.get_one::<String>("revocation_delay").map(|s| s.parse().expect("blocks is a number")),
        }
    }

    /// Builds the effective `NetworkParams` for this run: the network's
    /// defaults, with any regtest window override applied on top. Silently
    /// ignored outside regtest, matching a CLI aimed at driving the
    /// auction scenario rather than tuning a production network.
    pub fn network_params(&self) -> Arc<NetworkParams> {
        let params = NetworkParams::for_network(self.network);
        if self.network != NetworkType::Regtest {
            return params;
        }
        let mut params = (*params).clone();
        if let Some(v) = self.tree_interval {
            params.tree_interval = v;
        }
        if let Some(v) = self.bidding_period {
            params.bidding_period = v;
        }
        if let Some(v) = self.reveal_period {
            params.reveal_period = v;
        }
        if let Some(v) = self.transfer_lockup {
            params.transfer_lockup = v;
        }
        if let Some(v) = self.renewal_window {
            params.renewal_window = v;
        }
        if let Some(v) = self.revocation_delay {
            params.revocation_delay = v;
        }
        Arc::new(params)
    }
}
