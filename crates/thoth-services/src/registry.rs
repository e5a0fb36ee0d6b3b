//! Entity registry — lazily built index of one kind of catalog entry.
//!
//! A registry starts `Unloaded`. The first query scans the kind's directory
//! under the catalog root once and moves to `Loaded`. After that the index
//! only grows through `add`; disk is never rescanned and nothing is removed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thoth_core::entity::{Entity, Location, MalformedPathError, Specification};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),
    #[error("failed to scan {0}: {1}")]
    Scan(PathBuf, std::io::Error),
}

/// In-memory index. Insertion order is preserved for listings.
struct Index<E> {
    by_key: HashMap<(String, String), Arc<E>>,
    by_interface: HashMap<String, Vec<Arc<E>>>,
    interfaces: Vec<String>,
    entries: Vec<Arc<E>>,
}

impl<E: Entity> Index<E> {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            by_interface: HashMap::new(),
            interfaces: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Insert unless the pair is known; returns the stored entity.
    fn insert(&mut self, location: &Location, path: PathBuf) -> Arc<E> {
        let key = (location.interface.clone(), location.name.clone());
        if let Some(existing) = self.by_key.get(&key) {
            return existing.clone();
        }

        let entity = Arc::new(E::from_location(location, path));
        self.by_key.insert(key, entity.clone());
        if !self.by_interface.contains_key(&location.interface) {
            self.interfaces.push(location.interface.clone());
        }
        self.by_interface
            .entry(location.interface.clone())
            .or_default()
            .push(entity.clone());
        self.entries.push(entity.clone());
        entity
    }
}

enum RegistryState<E> {
    Unloaded,
    Loaded(Index<E>),
}

/// Registry for one entity kind, shared by cloning.
///
/// Mutations are serialized by one async mutex per registry.
pub struct Registry<E> {
    root: Arc<PathBuf>,
    state: Arc<Mutex<RegistryState<E>>>,
}

impl<E> Clone for Registry<E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            state: self.state.clone(),
        }
    }
}

impl<E: Entity> Registry<E> {
    /// Create an unloaded registry over `root` (the catalog root, not the
    /// kind directory).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
            state: Arc::new(Mutex::new(RegistryState::Unloaded)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory this registry scans.
    pub fn kind_dir(&self) -> PathBuf {
        self.root.join(E::KIND.dir_name())
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().await, RegistryState::Loaded(_))
    }

    /// Scan the kind directory if this is the first access.
    pub async fn ensure_loaded(&self) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;
        self.load_locked(&mut state)?;
        Ok(())
    }

    /// Register the file at `path`. Relative paths are taken relative to the
    /// catalog root; absolute paths must lie under it.
    pub async fn add(&self, path: impl AsRef<Path>) -> Result<Arc<E>, RegistryError> {
        let location = self.locate(path.as_ref())?;
        let mut state = self.state.lock().await;
        let index = self.load_locked(&mut state)?;
        let stored = self.root.join(&location.relative);
        Ok(index.insert(&location, stored))
    }

    pub async fn find_by_interface_and_name(
        &self,
        interface: &str,
        name: &str,
    ) -> Result<Option<Arc<E>>, RegistryError> {
        let key = (interface.to_string(), name.to_string());
        self.read(|index| index.by_key.get(&key).cloned()).await
    }

    /// Every entry of `interface`; empty if the interface is unknown.
    pub async fn find_all_by_interface(
        &self,
        interface: &str,
    ) -> Result<Vec<Arc<E>>, RegistryError> {
        self.read(|index| {
            index
                .by_interface
                .get(interface)
                .cloned()
                .unwrap_or_default()
        })
        .await
    }

    /// Every entry called `name`, across interfaces.
    pub async fn find_all_by_name(&self, name: &str) -> Result<Vec<Arc<E>>, RegistryError> {
        self.read(|index| {
            index
                .entries
                .iter()
                .filter(|e| e.name() == name)
                .cloned()
                .collect()
        })
        .await
    }

    pub async fn find_by_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<Arc<E>>, RegistryError> {
        let location = self.locate(path.as_ref())?;
        self.find_by_interface_and_name(&location.interface, &location.name)
            .await
    }

    pub async fn all(&self) -> Result<Vec<Arc<E>>, RegistryError> {
        self.read(|index| index.entries.clone()).await
    }

    pub async fn interface_names(&self) -> Result<Vec<String>, RegistryError> {
        self.read(|index| index.interfaces.clone()).await
    }

    pub async fn len(&self) -> Result<usize, RegistryError> {
        self.read(|index| index.entries.len()).await
    }

    async fn read<T>(&self, f: impl FnOnce(&Index<E>) -> T) -> Result<T, RegistryError> {
        let mut state = self.state.lock().await;
        let index = self.load_locked(&mut state)?;
        Ok(f(index))
    }

    /// Parse `path` into a location relative to the catalog root.
    fn locate(&self, path: &Path) -> Result<Location, MalformedPathError> {
        let relative = if path.is_absolute() {
            path.strip_prefix(self.root.as_path())
                .map_err(|_| MalformedPathError {
                    path: path.to_path_buf(),
                    reason: "outside the catalog root",
                })?
        } else {
            path
        };
        Location::parse(E::KIND, relative)
    }

    /// Transition `Unloaded → Loaded` with one directory scan.
    fn load_locked<'a>(
        &self,
        state: &'a mut RegistryState<E>,
    ) -> Result<&'a mut Index<E>, RegistryError> {
        if let RegistryState::Unloaded = state {
            let index = self.scan()?;
            *state = RegistryState::Loaded(index);
        }
        match state {
            RegistryState::Loaded(index) => Ok(index),
            RegistryState::Unloaded => unreachable!("registry loaded above"),
        }
    }

    fn scan(&self) -> Result<Index<E>, RegistryError> {
        let mut index = Index::new();
        let dir = self.kind_dir();
        if !dir.exists() {
            tracing::debug!(
                kind = ?E::KIND,
                dir = %dir.display(),
                "kind directory missing, empty registry"
            );
            return Ok(index);
        }

        let mut files = Vec::new();
        collect_files(&dir, &mut files)?;
        files.sort();

        for file in files {
            let relative = file.strip_prefix(self.root.as_path()).unwrap_or(&file);
            let location = Location::parse(E::KIND, relative)?;
            index.insert(&location, file);
        }

        tracing::debug!(kind = ?E::KIND, entries = index.entries.len(), "registry loaded");
        Ok(index)
    }
}

/// Recursively collect regular files below `dir`, skipping dotfiles.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RegistryError::Scan(dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| RegistryError::Scan(dir.to_path_buf(), e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| RegistryError::Scan(path.clone(), e))?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

impl Registry<Specification> {
    /// Drop cached results of every specification of `interface`.
    pub async fn invalidate_results(&self, interface: &str) -> Result<usize, RegistryError> {
        let specs = self.find_all_by_interface(interface).await?;
        for spec in &specs {
            spec.invalidate();
        }
        Ok(specs.len())
    }

    /// Aggregate cached results: any failure → `Some(false)`, all passed →
    /// `Some(true)`, anything unevaluated → `None`.
    pub async fn passes(&self, interface: &str) -> Result<Option<bool>, RegistryError> {
        let mut all_passed = true;
        for spec in self.find_all_by_interface(interface).await? {
            match spec.last_result() {
                Some(false) => return Ok(Some(false)),
                Some(true) => {}
                None => all_passed = false,
            }
        }
        Ok(all_passed.then_some(true))
    }
}
