//! thoth-services — registries, neighbor protocol client, content store,
//! sync engine and specification runner.

pub mod catalog;
pub mod neighbor;
pub mod peer;
pub mod registry;
pub mod runner;
pub mod store;
pub mod sync;

pub use catalog::Catalog;
pub use neighbor::{NeighborClient, NeighborError, Reply, Timeouts};
pub use peer::{PeerDirectory, PeerError};
pub use registry::{Registry, RegistryError};
pub use runner::{RunnerError, SpecRunner};
pub use store::{ContentStore, StoredFile};
pub use sync::{SyncEngine, SyncError, SyncTarget};
