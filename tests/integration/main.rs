//! Thoth integration test harness.
//!
//! Every test builds its catalogs in fresh temp directories and serves them
//! with real `thoth-api` routers on ephemeral loopback ports. Nothing needs
//! to be running beforehand.
//!
//!   cargo test --test integration

mod evaluation;
mod protocol;
mod sync;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use thoth_api::ApiState;
use thoth_core::config::EvaluationConfig;
use thoth_core::NeighborAddress;
use thoth_services::{Catalog, PeerDirectory, SpecRunner, SyncEngine, Timeouts};

// ── Catalog directories ───────────────────────────────────────────────────────

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A catalog root removed on drop.
pub struct TempCatalog {
    root: PathBuf,
}

impl TempCatalog {
    pub fn new(label: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "thoth-it-{}-{}-{}",
            label,
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).expect("create temp catalog");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file at a catalog-relative path.
    pub fn seed(&self, relative: &str, content: &str) -> &Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create seed directory");
        }
        std::fs::write(&path, content).expect("write seed file");
        self
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.join(relative))
            .unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }

    /// Every file under `dir`, catalog-relative, sorted.
    pub fn files_under(&self, dir: &str) -> Vec<String> {
        let mut out = Vec::new();
        collect(&self.root, &self.root.join(dir), &mut out);
        out.sort();
        out
    }
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

impl Drop for TempCatalog {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

// ── Nodes ─────────────────────────────────────────────────────────────────────

/// A catalog served on a loopback port. The server stops on drop.
pub struct Node {
    pub addr: NeighborAddress,
    pub state: ApiState,
    task: JoinHandle<()>,
}

impl Node {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn test_timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_millis(500),
        request: Duration::from_secs(5),
    }
}

/// Engine over `root` syncing from `peers`, with short timeouts.
pub fn engine(root: &Path, peers: PeerDirectory) -> SyncEngine {
    SyncEngine::new(Catalog::open(root), peers).with_timeouts(test_timeouts())
}

/// Specifications are shell scripts in these tests.
pub fn sh_runner(root: &Path) -> SpecRunner {
    let settings = EvaluationConfig {
        command: "sh".to_string(),
        args: Vec::new(),
    };
    SpecRunner::new(&settings, root)
}

pub async fn spawn_node(root: &Path, peers: PeerDirectory) -> Result<Node> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let port = listener.local_addr()?.port();

    let state = ApiState::new(engine(root, peers), sh_runner(root));
    let serving = state.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = thoth_api::serve_listener(listener, serving).await {
            eprintln!("test node exited: {e:#}");
        }
    });

    Ok(Node {
        addr: NeighborAddress::new("127.0.0.1", port),
        state,
        task,
    })
}

/// Serve an arbitrary router, for neighbors that misbehave on purpose.
pub async fn spawn_router(router: axum::Router) -> Result<(NeighborAddress, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((NeighborAddress::new("127.0.0.1", port), task))
}

/// An address nothing listens on.
pub fn dead_neighbor() -> NeighborAddress {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    NeighborAddress::new("127.0.0.1", port)
}

pub fn peers(addrs: &[&NeighborAddress]) -> PeerDirectory {
    let mut dir = PeerDirectory::new();
    for a in addrs {
        dir.register(a.host.clone(), a.port);
    }
    dir
}
