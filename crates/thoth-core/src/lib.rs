//! thoth-core — catalog entities, storage-path decomposition, wire and
//! report types, and configuration. All other Thoth crates depend on this one.

pub mod address;
pub mod config;
pub mod entity;
pub mod report;
pub mod wire;

pub use address::NeighborAddress;
pub use entity::{
    Entity, EntityKind, Implementation, Interface, Location, MalformedPathError, Specification,
};
