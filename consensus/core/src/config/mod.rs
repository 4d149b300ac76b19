pub mod params;

use hnsd_utils::networking::{ContextualNetAddress, NetAddress};
use params::NetworkParams;
use std::ops::Deref;
use std::sync::Arc;

/// Various node configuration bundled up under a single struct. Use
/// `Config::new` for directly building from a `NetworkParams` instance; for
/// anything more complex use `ConfigBuilder`. NOTE: this struct can be
/// implicitly de-refed into `NetworkParams`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Consensus-critical network parameters.
    pub params: Arc<NetworkParams>,

    //
    // Additional node configuration which is not consensus-sensitive.
    //
    /// Indicates whether this node is an archival node (keeps trie history
    /// back to genesis rather than pruning).
    pub is_archival: bool,

    /// Enable various sanity checks which might be compute-intensive.
    pub enable_sanity_checks: bool,

    /// Directory backing the `hnsd-database` RocksDB instance.
    pub data_dir: std::path::PathBuf,

    /// If undefined, sets it to 0.0.0.0.
    pub p2p_listen_address: ContextualNetAddress,

    pub externalip: Option<NetAddress>,

    /// A scale factor to apply to memory allocation bounds.
    pub ram_scale: f64,
}

impl Config {
    pub fn new(params: Arc<NetworkParams>) -> Self {
        Self {
            params,
            is_archival: false,
            enable_sanity_checks: false,
            data_dir: std::path::PathBuf::from("datadir"),
            p2p_listen_address: ContextualNetAddress::unspecified(),
            externalip: None,
            ram_scale: 1.0,
        }
    }

    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder { config: self.clone() }
    }
}

impl AsRef<NetworkParams> for Config {
    fn as_ref(&self) -> &NetworkParams {
        &self.params
    }
}

impl Deref for Config {
    type Target = NetworkParams;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(params: Arc<NetworkParams>) -> Self {
        Self { config: Config::new(params) }
    }

    pub fn set_archival(mut self) -> Self {
        self.config.is_archival = true;
        self
    }

    pub fn enable_sanity_checks(mut self) -> Self {
        self.config.enable_sanity_checks = true;
        self
    }

    pub fn set_data_dir(mut self, data_dir: std::path::PathBuf) -> Self {
        self.config.data_dir = data_dir;
        self
    }

    pub fn apply_args<F>(mut self, edit_func: F) -> Self
    where
        F: Fn(&mut Config),
    {
        edit_func(&mut self.config);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
