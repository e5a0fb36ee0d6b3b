//! Sync engine — pulls missing catalog entries from neighbors.
//!
//! A run for one interface goes through three stages, each visiting the
//! neighbors strictly in directory order:
//!
//!   1. locate: fetch the interface definition unless it is local
//!   2. specs: fetch every listed specification the registry lacks
//!   3. impls: same for implementations
//!
//! The registry is updated right after each write, before the next entry
//! or neighbor is looked at, so an entry offered by several neighbors is
//! written at most once per run. A neighbor that cannot be reached or
//! answers badly is recorded in the report and skipped; only local failures
//! (malformed stored paths, disk writes) abort the run.

use std::path::PathBuf;

use thoth_core::config::DEFAULT_EXTENSION;
use thoth_core::entity::{is_valid_extension, is_valid_segment, Entity, EntityKind};
use thoth_core::report::{EntrySync, InterfaceReport, Located, NeighborIssue, SyncReport};
use thoth_core::wire::EntryDescriptor;
use thoth_core::NeighborAddress;
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::neighbor::{NeighborClient, Reply, Timeouts};
use crate::peer::PeerDirectory;
use crate::registry::{Registry, RegistryError};
use crate::store::ContentStore;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to persist {path}: {reason:#}")]
    Persist { path: PathBuf, reason: anyhow::Error },
    #[error("invalid interface name {0:?}")]
    InvalidName(String),
}

/// What to sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// Every interface any neighbor lists.
    All,
    Interface(String),
}

impl SyncTarget {
    /// Empty input and `all` mean every interface.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | "all" => SyncTarget::All,
            name => SyncTarget::Interface(name.to_string()),
        }
    }
}

impl From<Option<String>> for SyncTarget {
    fn from(interface: Option<String>) -> Self {
        match interface {
            Some(name) => SyncTarget::parse(&name),
            None => SyncTarget::All,
        }
    }
}

pub struct SyncEngine {
    catalog: Catalog,
    peers: PeerDirectory,
    store: ContentStore,
    timeouts: Timeouts,
    default_extension: String,
    /// One run at a time: the dedup check and the write must not interleave
    /// with another run.
    gate: Mutex<()>,
}

impl SyncEngine {
    pub fn new(catalog: Catalog, peers: PeerDirectory) -> Self {
        let store = ContentStore::new(catalog.root());
        Self {
            catalog,
            peers,
            store,
            timeouts: Timeouts::default(),
            default_extension: DEFAULT_EXTENSION.to_string(),
            gate: Mutex::new(()),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_default_extension(mut self, extension: impl Into<String>) -> Self {
        self.default_extension = extension.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    pub async fn sync(&self, target: SyncTarget) -> Result<SyncReport, SyncError> {
        let _running = self.gate.lock().await;
        let mut report = SyncReport::default();

        match target {
            SyncTarget::All => self.sync_all(&mut report).await?,
            SyncTarget::Interface(name) => {
                if !is_valid_segment(&name) {
                    return Err(SyncError::InvalidName(name));
                }
                let outcome = self.sync_interface(&name, &mut report).await?;
                report.interfaces.push(outcome);
            }
        }

        tracing::info!(
            interfaces = report.interfaces.len(),
            found = report.found(),
            issues = report.issues.len(),
            "sync finished"
        );
        Ok(report)
    }

    /// Wildcard: each neighbor's listing, synced name by name, one neighbor
    /// fully processed before the next.
    async fn sync_all(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        tracing::info!(neighbors = self.peers.len(), "synchronizing with all neighbors");

        for addr in self.peers.iter() {
            let Some(client) = self.connect(addr, "list interfaces", report).await else {
                continue;
            };

            let reply = client.list_interfaces().await;
            self.note_failure(addr, "list interfaces", &reply, report);

            for descriptor in reply.found_or_default() {
                if !is_valid_segment(&descriptor.name) {
                    let reason = format!("invalid interface name {:?}", descriptor.name);
                    self.issue(report, addr, "list interfaces", reason);
                    continue;
                }
                let outcome = self.sync_interface(&descriptor.name, report).await?;
                report.interfaces.push(outcome);
            }
        }
        Ok(())
    }

    async fn sync_interface(
        &self,
        interface: &str,
        report: &mut SyncReport,
    ) -> Result<InterfaceReport, SyncError> {
        let located = self.locate_interface(interface, report).await?;
        if located == Located::NotFound {
            tracing::warn!(interface, "could not find this interface on any neighbor");
            return Ok(InterfaceReport {
                interface: interface.to_string(),
                located,
                specifications: EntrySync::default(),
                implementations: EntrySync::default(),
            });
        }

        let specifications = self
            .sync_entries(&self.catalog.specifications, interface, report)
            .await?;
        let implementations = self
            .sync_entries(&self.catalog.implementations, interface, report)
            .await?;

        if !implementations.fetched.is_empty() {
            let stale = self
                .catalog
                .specifications
                .invalidate_results(interface)
                .await?;
            tracing::debug!(
                interface,
                stale,
                "implementations changed, specification results invalidated"
            );
        }

        Ok(InterfaceReport {
            interface: interface.to_string(),
            located,
            specifications,
            implementations,
        })
    }

    /// Stage 1: use the local definition, or take it from the first
    /// neighbor that has one.
    async fn locate_interface(
        &self,
        interface: &str,
        report: &mut SyncReport,
    ) -> Result<Located, SyncError> {
        let interfaces = &self.catalog.interfaces;
        if interfaces.find_by_interface_and_name(interface, interface).await?.is_some() {
            return Ok(Located::Local);
        }

        for addr in self.peers.iter() {
            let Some(client) = self.connect(addr, "locate", report).await else {
                continue;
            };

            let descriptor = match client.check_interface_exists(interface).await {
                Reply::Found(d) => d,
                other => {
                    self.note_failure(addr, "locate", &other, report);
                    continue;
                }
            };

            tracing::info!(interface, neighbor = %addr, "found interface, downloading");
            let content = match client.fetch_interface_content(interface).await {
                Reply::Found(bytes) => bytes,
                other => {
                    let reason = other.failure().unwrap_or_else(|| "content not found".to_string());
                    self.issue(report, addr, "fetch interface", reason);
                    continue;
                }
            };

            let extension = self.extension_for(&descriptor);
            let relative = EntityKind::Interface.relative_path(interface, interface, extension);
            self.persist(interfaces, relative, &content).await?;
            return Ok(Located::Fetched { from: addr.clone() });
        }

        Ok(Located::NotFound)
    }

    /// Stages 2 and 3: merge every listed entry the registry does not have.
    async fn sync_entries<E: Entity>(
        &self,
        registry: &Registry<E>,
        interface: &str,
        report: &mut SyncReport,
    ) -> Result<EntrySync, SyncError> {
        let kind = E::KIND;
        let stage = kind.dir_name();
        let mut outcome = EntrySync::default();

        for addr in self.peers.iter() {
            let Some(client) = self.connect(addr, stage, report).await else {
                continue;
            };

            let reply = client.list_entries(kind, interface).await;
            self.note_failure(addr, stage, &reply, report);
            let entries = reply.found_or_default();
            if entries.is_empty() {
                continue;
            }

            outcome.found = true;
            tracing::info!(
                interface,
                neighbor = %addr,
                kind = stage,
                count = entries.len(),
                "synchronizing entries"
            );

            for descriptor in entries {
                let name = descriptor.name.as_str();
                if !is_valid_segment(name) {
                    self.issue(report, addr, stage, format!("invalid entry name {name:?}"));
                    continue;
                }
                if registry.find_by_interface_and_name(interface, name).await?.is_some() {
                    continue;
                }

                let content = match client.fetch_entry_content(kind, interface, name).await {
                    Reply::Found(bytes) => bytes,
                    other => {
                        let reason = other.failure().unwrap_or_else(|| format!("{name} not found"));
                        self.issue(report, addr, stage, reason);
                        continue;
                    }
                };

                let relative = kind.relative_path(interface, name, self.extension_for(&descriptor));
                self.persist(registry, relative, &content).await?;
                tracing::info!(interface, name, neighbor = %addr, kind = stage, "=> fetched");
                outcome.fetched.push(name.to_string());
            }
        }

        if !outcome.found {
            tracing::warn!(interface, kind = stage, "could not query entries from any neighbor");
        }
        Ok(outcome)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn connect(
        &self,
        addr: &NeighborAddress,
        stage: &str,
        report: &mut SyncReport,
    ) -> Option<NeighborClient> {
        match NeighborClient::connect(addr, self.timeouts).await {
            Ok(client) => Some(client),
            Err(e) => {
                self.issue(report, addr, stage, e.to_string());
                None
            }
        }
    }

    /// Write content, then register it. The registry sees the entry before
    /// anything else is fetched.
    async fn persist<E: Entity>(
        &self,
        registry: &Registry<E>,
        relative: PathBuf,
        content: &[u8],
    ) -> Result<(), SyncError> {
        let stored = self
            .store
            .write(&relative, content)
            .map_err(|reason| SyncError::Persist {
                path: relative.clone(),
                reason,
            })?;
        registry.add(&stored.relative).await?;
        tracing::debug!(
            path = %stored.relative.display(),
            bytes = stored.bytes,
            digest = %stored.digest,
            "entry stored"
        );
        Ok(())
    }

    fn extension_for<'a>(&'a self, descriptor: &'a EntryDescriptor) -> &'a str {
        descriptor
            .extension()
            .filter(|ext| is_valid_extension(ext))
            .unwrap_or(self.default_extension.as_str())
    }

    fn note_failure<T>(
        &self,
        addr: &NeighborAddress,
        stage: &str,
        reply: &Reply<T>,
        report: &mut SyncReport,
    ) {
        if let Some(reason) = reply.failure() {
            self.issue(report, addr, stage, reason);
        }
    }

    fn issue(&self, report: &mut SyncReport, addr: &NeighborAddress, stage: &str, reason: String) {
        tracing::warn!(neighbor = %addr, stage, reason = %reason, "neighbor skipped");
        report.issues.push(NeighborIssue {
            neighbor: addr.clone(),
            stage: stage.to_string(),
            reason,
        });
    }
}
