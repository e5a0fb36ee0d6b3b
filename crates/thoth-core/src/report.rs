//! Outcome of a sync run, as returned by `POST /sync`.

use serde::{Deserialize, Serialize};

use crate::address::NeighborAddress;

/// Where the interface definition came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Located {
    /// Already present in the local catalog.
    Local,
    /// Downloaded from this neighbor during the run.
    Fetched { from: NeighborAddress },
    /// No neighbor confirmed the interface.
    NotFound,
}

/// Specification or implementation merge for one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySync {
    /// At least one neighbor returned a non-empty listing.
    pub found: bool,
    /// Entry names written to disk during the run, in fetch order.
    pub fetched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceReport {
    pub interface: String,
    pub located: Located,
    pub specifications: EntrySync,
    pub implementations: EntrySync,
}

impl InterfaceReport {
    pub fn found(&self) -> bool {
        !matches!(self.located, Located::NotFound)
    }
}

/// A neighbor that was skipped or answered badly during one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborIssue {
    pub neighbor: NeighborAddress,
    pub stage: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub interfaces: Vec<InterfaceReport>,
    pub issues: Vec<NeighborIssue>,
}

impl SyncReport {
    /// Coarse outcome: did any requested interface resolve.
    pub fn found(&self) -> bool {
        self.interfaces.iter().any(InterfaceReport::found)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceReport> {
        self.interfaces.iter().find(|r| r.interface == name)
    }
}
