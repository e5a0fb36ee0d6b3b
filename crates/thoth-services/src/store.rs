//! Content store — writes fetched entries under the catalog root.
//!
//! Writes are atomic: hidden temp file in the target directory, then
//! rename. Registry scans skip dotfiles, so a half-written entry is never
//! indexed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Result of persisting one entry.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Catalog-relative path, ready for `Registry::add`.
    pub relative: PathBuf,
    pub bytes: u64,
    /// blake3 of the content, hex encoded.
    pub digest: String,
}

#[derive(Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` at the catalog-relative path, replacing any file there.
    pub fn write(&self, relative: &Path, data: &[u8]) -> Result<StoredFile> {
        let path = self.root.join(relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let file_name = path
            .file_name()
            .with_context(|| format!("no file name in {}", relative.display()))?
            .to_string_lossy()
            .into_owned();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));
        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;
            file.write_all(data).context("failed to write entry content")?;
            file.sync_all().context("failed to sync entry to disk")?;
        }

        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        let digest = hex::encode(blake3::hash(data).as_bytes());
        tracing::trace!(path = %path.display(), digest = %digest, "entry written");

        Ok(StoredFile {
            relative: relative.to_path_buf(),
            bytes: data.len() as u64,
            digest,
        })
    }

    /// Read an entry back, by catalog-relative or absolute path.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        fs::read(&path).with_context(|| format!("failed to read entry: {}", path.display()))
    }
}
