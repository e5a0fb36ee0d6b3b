//! Neighbor addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A remote node reachable at a fixed host and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborAddress {
    pub host: String,
    pub port: u16,
}

impl NeighborAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL for HTTP requests against this neighbor.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self)
    }
}

impl fmt::Display for NeighborAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid neighbor address {0:?}: expected host:port")]
pub struct AddressParseError(pub String);

impl FromStr for NeighborAddress {
    type Err = AddressParseError;

    /// Accepts `host:port` and `[v6-host]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AddressParseError(s.to_string());
        let s = s.trim();

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(err)?;
            (host, tail.strip_prefix(':').ok_or_else(err)?)
        } else {
            s.rsplit_once(':').ok_or_else(err)?
        };

        if host.is_empty() {
            return Err(err());
        }
        let port = port.parse().map_err(|_| err())?;
        Ok(Self::new(host, port))
    }
}
