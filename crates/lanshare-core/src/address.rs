//! Node addresses.
//!
//! A node is identified by the IP it is reachable on plus the port of its
//! point-to-point message listener. On a real LAN every node uses the
//! well-known MESSAGE_PORT, so the textual form also accepts a bare IP.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::wire::MESSAGE_PORT;

/// Network-reachable identity of a node. Used as the key for peer
/// membership and compared against the local address to avoid
/// self-registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddress(SocketAddr);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty node address")]
    Empty,
    #[error("invalid node address '{0}'")]
    Invalid(String),
}

impl NodeAddress {
    /// Address on the well-known message port.
    pub fn new(ip: IpAddr) -> Self {
        Self(SocketAddr::new(ip, MESSAGE_PORT))
    }

    pub fn with_port(ip: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(ip, port))
    }

    /// Loopback fallback used when no routable interface is found.
    pub fn loopback(port: u16) -> Self {
        Self::with_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for NodeAddress {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NodeAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self(addr));
        }
        s.parse::<IpAddr>()
            .map(Self::new)
            .map_err(|_| AddressError::Invalid(s.to_string()))
    }
}

impl Serialize for NodeAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
