//! The three registries of one catalog root.

use std::path::{Path, PathBuf};

use thoth_core::entity::{Implementation, Interface, Specification};

use crate::registry::Registry;

/// Interface, implementation and specification registries sharing a root.
///
/// Cloning shares the underlying indexes.
#[derive(Clone)]
pub struct Catalog {
    pub interfaces: Registry<Interface>,
    pub implementations: Registry<Implementation>,
    pub specifications: Registry<Specification>,
}

impl Catalog {
    /// Registries start unloaded; nothing touches disk until first use.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            interfaces: Registry::new(root.clone()),
            implementations: Registry::new(root.clone()),
            specifications: Registry::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.interfaces.root()
    }
}
