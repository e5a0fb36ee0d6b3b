//! JSON bodies exchanged between nodes.
//!
//! Shapes follow the catalog HTTP protocol:
//!
//!   GET /interfaces                    → InterfaceList
//!   GET /interfaces/{name}             → EntryDescriptor (json accept) or raw bytes
//!   GET /specifications/{interface}    → SpecificationList
//!   GET /implementations/{interface}   → ImplementationList
//!
//! Listings group files by interface. Readers flatten every group.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::address::NeighborAddress;
use crate::entity::Entity;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PLAIN_CONTENT_TYPE: &str = "text/plain";

/// One catalog entry as described on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    pub name: String,
    /// Catalog-relative storage path on the serving node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Owning interface; informational only, never read back.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl EntryDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            interface: None,
        }
    }

    pub fn of<E: Entity>(entity: &E) -> Self {
        let path = entity
            .relative_path()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let interface = E::KIND
            .is_nested()
            .then(|| entity.interface_name().to_string());
        Self {
            name: entity.name().to_string(),
            path: Some(path),
            interface,
        }
    }

    /// Extension of the remote file, if the descriptor carries a path.
    pub fn extension(&self) -> Option<&str> {
        let file = self.path.as_deref()?.rsplit('/').next()?;
        match file.rfind('.') {
            Some(idx) if idx > 0 => Some(&file[idx + 1..]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceList {
    pub interfaces: Vec<EntryDescriptor>,
}

/// Files of one interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryGroup {
    pub name: String,
    #[serde(default)]
    pub files: Vec<EntryDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationList {
    pub specifications: Vec<EntryGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImplementationList {
    pub implementations: Vec<EntryGroup>,
}

/// A listing response that reduces to a flat list of descriptors.
pub trait Listing: DeserializeOwned {
    fn into_entries(self) -> Vec<EntryDescriptor>;
}

impl Listing for InterfaceList {
    fn into_entries(self) -> Vec<EntryDescriptor> {
        self.interfaces
    }
}

impl Listing for SpecificationList {
    fn into_entries(self) -> Vec<EntryDescriptor> {
        self.specifications
            .into_iter()
            .flat_map(|g| g.files)
            .collect()
    }
}

impl Listing for ImplementationList {
    fn into_entries(self) -> Vec<EntryDescriptor> {
        self.implementations
            .into_iter()
            .flat_map(|g| g.files)
            .collect()
    }
}

/// `GET /`: everything the node knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub interfaces: Vec<EntryDescriptor>,
    pub implementations: Vec<EntryGroup>,
    pub specifications: Vec<EntryGroup>,
}

// ── Local control surface ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborsResponse {
    pub neighbors: Vec<NeighborAddress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub catalog_root: String,
    pub interfaces: usize,
    pub implementations: usize,
    pub specifications: usize,
    pub neighbors: usize,
}

/// `POST /sync` body. No interface means every interface the neighbors list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub interface: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationResult {
    pub name: String,
    pub passed: bool,
}

/// `POST /evaluate/{interface}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub interface: String,
    pub passed: bool,
    pub results: Vec<SpecificationResult>,
}
