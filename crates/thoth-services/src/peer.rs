//! Peer directory — the ordered list of configured neighbors.

use thoth_core::address::AddressParseError;
use thoth_core::NeighborAddress;

#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("{hosts} hosts but {ports} ports")]
    LengthMismatch { hosts: usize, ports: usize },
    #[error(transparent)]
    InvalidAddress(#[from] AddressParseError),
}

/// Neighbors in registration order.
///
/// Append-only and filled at startup. Duplicates are kept: a neighbor
/// registered twice is contacted twice per sync.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    neighbors: Vec<NeighborAddress>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `host:port` strings, in order.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, PeerError> {
        let mut directory = Self::new();
        for spec in specs {
            let addr: NeighborAddress = spec.as_ref().parse()?;
            directory.register(addr.host, addr.port);
        }
        Ok(directory)
    }

    pub fn register(&mut self, host: impl Into<String>, port: u16) {
        let addr = NeighborAddress::new(host, port);
        tracing::info!(neighbor = %addr, "registered neighbor");
        self.neighbors.push(addr);
    }

    /// Register parallel lists of hosts and ports.
    pub fn register_all<S: AsRef<str>>(
        &mut self,
        hosts: &[S],
        ports: &[u16],
    ) -> Result<(), PeerError> {
        if hosts.len() != ports.len() {
            return Err(PeerError::LengthMismatch {
                hosts: hosts.len(),
                ports: ports.len(),
            });
        }
        for (host, port) in hosts.iter().zip(ports) {
            self.register(host.as_ref(), *port);
        }
        Ok(())
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.neighbors.iter().map(|n| n.host.as_str()).collect()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.neighbors.iter().map(|n| n.port).collect()
    }

    /// First registered neighbor.
    pub fn primary(&self) -> Option<&NeighborAddress> {
        self.neighbors.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborAddress> {
        self.neighbors.iter()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
