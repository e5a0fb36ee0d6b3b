//! thothd — Thoth catalog node.

use anyhow::{Context, Result};

use thoth_api::ApiState;
use thoth_core::config::ThothConfig;
use thoth_core::entity::EntityKind;
use thoth_services::{Catalog, PeerDirectory, SpecRunner, SyncEngine, SyncTarget, Timeouts};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = ThothConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = ThothConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ThothConfig::default()
    });

    // Catalog
    let root = config.catalog.root.clone();
    for kind in [
        EntityKind::Interface,
        EntityKind::Implementation,
        EntityKind::Specification,
    ] {
        let dir = root.join(kind.dir_name());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create catalog directory: {}", dir.display()))?;
    }
    tracing::info!(root = %root.display(), "catalog opened");
    let catalog = Catalog::open(&root);

    // Neighbors
    let peers = PeerDirectory::from_specs(&config.neighbors.peers)
        .context("invalid neighbors.peers entry")?;
    if peers.is_empty() {
        tracing::info!("no neighbors configured, sync will find nothing");
    }

    let timeouts = Timeouts {
        connect: config.neighbors.connect_timeout(),
        request: config.neighbors.request_timeout(),
    };
    let engine = SyncEngine::new(catalog, peers)
        .with_timeouts(timeouts)
        .with_default_extension(config.catalog.default_extension.clone());
    let runner = SpecRunner::new(&config.evaluation, &root);
    let state = ApiState::new(engine, runner);

    if config.sync.on_startup {
        match state.engine.sync(SyncTarget::All).await {
            Ok(report) => tracing::info!(
                interfaces = report.interfaces.len(),
                issues = report.issues.len(),
                "startup sync finished"
            ),
            Err(e) => tracing::error!(error = %e, "startup sync failed"),
        }
    }

    // ── Serve until interrupted ──────────────────────────────────────────────

    let bind_addr = config.network.bind_addr.clone();
    let port = config.network.api_port;

    tokio::select! {
        r = thoth_api::serve(state, &bind_addr, port) => {
            r.with_context(|| format!("API server on {bind_addr}:{port} failed"))?;
        }
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
    }

    Ok(())
}
