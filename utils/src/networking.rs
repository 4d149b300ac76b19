//! Minimal network-address types for daemon configuration (listen/connect
//! addresses). The P2P transport itself is out of scope for this crate; these
//! types exist so config parsing has somewhere to land.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid network address: {0}")]
    InvalidAddress(String),
}

/// A fully resolved `ip:port` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetAddress(pub SocketAddr);

impl NetAddress {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(ip, port))
    }
}

impl Display for NetAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for NetAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SocketAddr::from_str(s).map(Self).map_err(|_| AddressError::InvalidAddress(s.to_string()))
    }
}

/// An address that may omit its port, to be filled in with a network default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextualNetAddress {
    pub ip: IpAddr,
    pub port: Option<u16>,
}

impl ContextualNetAddress {
    pub fn unspecified() -> Self {
        Self { ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: None }
    }

    pub fn normalize(&self, default_port: u16) -> NetAddress {
        NetAddress::new(self.ip, self.port.unwrap_or(default_port))
    }
}

impl Display for ContextualNetAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.ip, port),
            None => write!(f, "{}", self.ip),
        }
    }
}

impl FromStr for ContextualNetAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = SocketAddr::from_str(s) {
            return Ok(Self { ip: addr.ip(), port: Some(addr.port()) });
        }
        IpAddr::from_str(s).map(|ip| Self { ip, port: None }).map_err(|_| AddressError::InvalidAddress(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_address_parse() {
        let with_port: ContextualNetAddress = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(with_port.port, Some(5000));
        let without_port: ContextualNetAddress = "127.0.0.1".parse().unwrap();
        assert_eq!(without_port.port, None);
        assert_eq!(without_port.normalize(5349).0.port(), 5349);
    }

    #[test]
    fn test_invalid_address() {
        assert!(ContextualNetAddress::from_str("not-an-address").is_err());
    }
}
