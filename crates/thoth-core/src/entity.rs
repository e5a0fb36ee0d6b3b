//! Catalog entities and storage-path decomposition.
//!
//! Every entity lives in one file under the catalog root:
//!
//!   interface/<name>.<ext>
//!   implementation/<interface>/<name>.<ext>
//!   specification/<interface>/<name>.<ext>
//!
//! Identity is derived from that path alone. The final extension is
//! stripped, the last segment is the entity name, and everything between
//! the kind directory and the last segment is the interface name.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// The three kinds of catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Interface,
    Implementation,
    Specification,
}

impl EntityKind {
    /// Directory under the catalog root holding this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            EntityKind::Interface => "interface",
            EntityKind::Implementation => "implementation",
            EntityKind::Specification => "specification",
        }
    }

    /// Implementations and specifications live one directory deeper,
    /// grouped by interface.
    pub fn is_nested(self) -> bool {
        !matches!(self, EntityKind::Interface)
    }

    /// Catalog-relative storage path for an entry of this kind.
    pub fn relative_path(self, interface: &str, name: &str, extension: &str) -> PathBuf {
        let file = format!("{name}.{extension}");
        let dir = PathBuf::from(self.dir_name());
        if self.is_nested() {
            dir.join(interface).join(file)
        } else {
            dir.join(file)
        }
    }
}

/// A path that cannot be decomposed into `(interface, name)`.
///
/// Given the storage layout this never happens for files the node wrote
/// itself, so it is surfaced rather than skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed catalog path {}: {reason}", path.display())]
pub struct MalformedPathError {
    pub path: PathBuf,
    pub reason: &'static str,
}

impl MalformedPathError {
    fn new(path: &Path, reason: &'static str) -> Self {
        Self {
            path: path.to_path_buf(),
            reason,
        }
    }
}

/// The identity of an entry, parsed from its catalog-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub kind: EntityKind,
    pub interface: String,
    pub name: String,
    pub extension: String,
    /// Normalized catalog-relative path (`.` components removed).
    pub relative: PathBuf,
}

impl Location {
    /// Decompose a catalog-relative path for the given kind.
    pub fn parse(kind: EntityKind, relative: &Path) -> Result<Self, MalformedPathError> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(s) => match s.to_str() {
                    Some(s) => segments.push(s),
                    None => return Err(MalformedPathError::new(relative, "not valid UTF-8")),
                },
                _ => {
                    return Err(MalformedPathError::new(
                        relative,
                        "absolute or parent component",
                    ))
                }
            }
        }

        match segments.first() {
            Some(first) if *first == kind.dir_name() => {}
            _ => {
                return Err(MalformedPathError::new(
                    relative,
                    "not under the kind directory",
                ))
            }
        }

        let below = &segments[1..];
        let depth_ok = if kind.is_nested() {
            below.len() >= 2
        } else {
            below.len() == 1
        };
        if !depth_ok {
            return Err(MalformedPathError::new(
                relative,
                "unexpected directory depth",
            ));
        }

        let Some((file, dirs)) = below.split_last() else {
            return Err(MalformedPathError::new(relative, "missing file name"));
        };
        let (name, extension) = match file.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < file.len() => (&file[..idx], &file[idx + 1..]),
            _ => return Err(MalformedPathError::new(relative, "missing extension")),
        };

        let interface = if kind.is_nested() {
            dirs.join("/")
        } else {
            name.to_string()
        };

        Ok(Self {
            kind,
            interface,
            name: name.to_string(),
            extension: extension.to_string(),
            relative: segments.iter().collect(),
        })
    }
}

/// Whether a name is safe to use as a single storage path segment.
///
/// Names arriving from neighbors are checked with this before they are
/// turned into file paths.
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

/// Whether an extension is safe to append to a stored file name.
pub fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Common shape of the three entity kinds, used by the generic registry.
pub trait Entity: std::fmt::Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Build the entity for a parsed location; `path` is where the file lives.
    fn from_location(location: &Location, path: PathBuf) -> Self;

    fn interface_name(&self) -> &str;
    fn name(&self) -> &str;
    fn path(&self) -> &Path;
    fn relative_path(&self) -> &Path;
}

// ── Interface ─────────────────────────────────────────────────────────────────

/// A named contract definition, one file per name.
#[derive(Debug)]
pub struct Interface {
    name: String,
    path: PathBuf,
    relative: PathBuf,
}

impl Entity for Interface {
    const KIND: EntityKind = EntityKind::Interface;

    fn from_location(location: &Location, path: PathBuf) -> Self {
        Self {
            name: location.name.clone(),
            path,
            relative: location.relative.clone(),
        }
    }

    fn interface_name(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn relative_path(&self) -> &Path {
        &self.relative
    }
}

// ── Implementation ────────────────────────────────────────────────────────────

/// A named realization of an interface.
#[derive(Debug)]
pub struct Implementation {
    interface: String,
    name: String,
    path: PathBuf,
    relative: PathBuf,
}

impl Entity for Implementation {
    const KIND: EntityKind = EntityKind::Implementation;

    fn from_location(location: &Location, path: PathBuf) -> Self {
        Self {
            interface: location.interface.clone(),
            name: location.name.clone(),
            path,
            relative: location.relative.clone(),
        }
    }

    fn interface_name(&self) -> &str {
        &self.interface
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn relative_path(&self) -> &Path {
        &self.relative
    }
}

// ── Specification ─────────────────────────────────────────────────────────────

const RESULT_UNKNOWN: u8 = 0;
const RESULT_PASSED: u8 = 1;
const RESULT_FAILED: u8 = 2;

/// A named executable check for an interface's implementations.
///
/// Carries the last evaluation result. The result goes stale when an
/// implementation of the same interface changes.
#[derive(Debug)]
pub struct Specification {
    interface: String,
    name: String,
    path: PathBuf,
    relative: PathBuf,
    result: AtomicU8,
}

impl Specification {
    /// Cached result of the last evaluation, if still valid.
    pub fn last_result(&self) -> Option<bool> {
        match self.result.load(Ordering::Acquire) {
            RESULT_PASSED => Some(true),
            RESULT_FAILED => Some(false),
            _ => None,
        }
    }

    pub fn record_result(&self, passed: bool) {
        let value = if passed { RESULT_PASSED } else { RESULT_FAILED };
        self.result.store(value, Ordering::Release);
    }

    /// Forget the cached result; called when an implementation changed.
    pub fn invalidate(&self) {
        self.result.store(RESULT_UNKNOWN, Ordering::Release);
    }
}

impl Entity for Specification {
    const KIND: EntityKind = EntityKind::Specification;

    fn from_location(location: &Location, path: PathBuf) -> Self {
        Self {
            interface: location.interface.clone(),
            name: location.name.clone(),
            path,
            relative: location.relative.clone(),
            result: AtomicU8::new(RESULT_UNKNOWN),
        }
    }

    fn interface_name(&self) -> &str {
        &self.interface
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn relative_path(&self) -> &Path {
        &self.relative
    }
}
