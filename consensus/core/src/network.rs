use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use hnsd_addresses::Network as AddressNetwork;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

#[derive(thiserror::Error, PartialEq, Eq, Debug, Clone)]
pub enum NetworkTypeError {
    #[error("Invalid network type: {0}")]
    InvalidNetworkType(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Regtest,
    Simnet,
}

impl NetworkType {
    pub fn default_p2p_port(&self) -> u16 {
        match self {
            NetworkType::Mainnet => 12038,
            NetworkType::Testnet => 13038,
            NetworkType::Regtest => 14038,
            NetworkType::Simnet => 15038,
        }
    }

    pub fn default_rpc_port(&self) -> u16 {
        match self {
            NetworkType::Mainnet => 12037,
            NetworkType::Testnet => 13037,
            NetworkType::Regtest => 14037,
            NetworkType::Simnet => 15037,
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        static NETWORK_TYPES: [NetworkType; 4] =
            [NetworkType::Mainnet, NetworkType::Testnet, NetworkType::Regtest, NetworkType::Simnet];
        NETWORK_TYPES.iter().copied()
    }
}

impl From<NetworkType> for AddressNetwork {
    fn from(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => AddressNetwork::Main,
            NetworkType::Testnet => AddressNetwork::Test,
            NetworkType::Regtest => AddressNetwork::Regtest,
            NetworkType::Simnet => AddressNetwork::Simnet,
        }
    }
}

impl TryFrom<AddressNetwork> for NetworkType {
    type Error = NetworkTypeError;
    fn try_from(network: AddressNetwork) -> Result<Self, Self::Error> {
        match network {
            AddressNetwork::Main => Ok(NetworkType::Mainnet),
            AddressNetwork::Test => Ok(NetworkType::Testnet),
            AddressNetwork::Regtest => Ok(NetworkType::Regtest),
            AddressNetwork::Simnet => Ok(NetworkType::Simnet),
            #[allow(unreachable_patterns)]
            #[cfg(test)]
            _ => Err(NetworkTypeError::InvalidNetworkType(format!("{network:?}"))),
        }
    }
}

impl FromStr for NetworkType {
    type Err = NetworkTypeError;
    fn from_str(network_type: &str) -> Result<Self, Self::Err> {
        match network_type {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            "regtest" => Ok(NetworkType::Regtest),
            "simnet" => Ok(NetworkType::Simnet),
            _ => Err(NetworkTypeError::InvalidNetworkType(network_type.to_string())),
        }
    }
}

impl Display for NetworkType {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Regtest => "regtest",
            NetworkType::Simnet => "simnet",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, PartialEq, Eq, Debug, Clone)]
pub enum NetworkInstanceError {
    #[error("Invalid network name prefix: {0}. The expected prefix is 'hnsd'.")]
    InvalidPrefix(String),

    #[error(transparent)]
    InvalidNetworkType(#[from] NetworkTypeError),

    #[error("Invalid network suffix: {0}. Only 32 bits unsigned integer (u32) are supported.")]
    InvalidSuffix(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub struct NetworkInstance {
    pub network_type: NetworkType,
    pub suffix: Option<u32>,
}

impl NetworkInstance {
    pub fn new(network_type: NetworkType, suffix: Option<u32>) -> Self {
        Self { network_type, suffix }
    }

    pub fn name(&self) -> String {
        if let Some(suffix) = self.suffix {
            format!("hnsd-{}-{}", self.network_type, suffix)
        } else {
            format!("hnsd-{}", self.network_type)
        }
    }
}

impl Deref for NetworkInstance {
    type Target = NetworkType;

    fn deref(&self) -> &Self::Target {
        &self.network_type
    }
}

impl From<NetworkType> for NetworkInstance {
    fn from(value: NetworkType) -> Self {
        Self::new(value, None)
    }
}

impl From<NetworkInstance> for AddressNetwork {
    fn from(net: NetworkInstance) -> Self {
        (*net).into()
    }
}

impl FromStr for NetworkInstance {
    type Err = NetworkInstanceError;
    fn from_str(network_name: &str) -> Result<Self, Self::Err> {
        let mut parts = network_name.split('-');
        let prefix = parts.next().unwrap_or_default();
        if prefix != "hnsd" {
            return Err(NetworkInstanceError::InvalidPrefix(prefix.to_string()));
        }
        let network_type = NetworkType::from_str(parts.next().unwrap_or_default())?;
        let suffix =
            parts.next().map(|x| u32::from_str(x).map_err(|_| NetworkInstanceError::InvalidSuffix(x.to_string()))).transpose()?;
        Ok(Self::new(network_type, suffix))
    }
}

impl Display for NetworkInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
