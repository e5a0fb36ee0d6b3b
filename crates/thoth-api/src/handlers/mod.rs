//! HTTP handlers — the catalog wire protocol and the local control surface.

pub mod entries;
pub mod evaluate;
pub mod interfaces;
pub mod status;
pub mod sync;

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use thoth_core::entity::Entity;
use thoth_core::wire::{EntryDescriptor, EntryGroup, PLAIN_CONTENT_TYPE};
use thoth_services::{Catalog, Registry, SpecRunner, SyncEngine};

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Catalog,
    pub engine: Arc<SyncEngine>,
    pub runner: Arc<SpecRunner>,
}

impl ApiState {
    /// The engine's catalog is the one served.
    pub fn new(engine: SyncEngine, runner: SpecRunner) -> Self {
        Self {
            catalog: engine.catalog().clone(),
            engine: Arc::new(engine),
            runner: Arc::new(runner),
        }
    }
}

type ApiError = (StatusCode, String);

// ── Shared helpers ────────────────────────────────────────────────────────────

fn internal(err: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn not_found(what: impl std::fmt::Display) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// Whether the client asked for the JSON descriptor rather than raw content.
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|media| {
            let media = media.split(';').next().unwrap_or("").trim();
            media.eq_ignore_ascii_case("application/json")
        })
}

/// Entries of one interface as a single wire group.
async fn group_of<E: Entity>(
    registry: &Registry<E>,
    interface: &str,
) -> Result<EntryGroup, ApiError> {
    let files = registry
        .find_all_by_interface(interface)
        .await
        .map_err(internal)?
        .iter()
        .map(|e| EntryDescriptor::of(e.as_ref()))
        .collect();
    Ok(EntryGroup {
        name: interface.to_string(),
        files,
    })
}

/// Every entry of the registry, one group per interface.
async fn all_groups<E: Entity>(registry: &Registry<E>) -> Result<Vec<EntryGroup>, ApiError> {
    let mut groups = Vec::new();
    for interface in registry.interface_names().await.map_err(internal)? {
        groups.push(group_of(registry, &interface).await?);
    }
    Ok(groups)
}

/// Stored file content, served as plain bytes.
async fn raw_content<E: Entity>(entity: &E) -> Result<Response, ApiError> {
    let body = tokio::fs::read(entity.path()).await.map_err(|e| {
        internal(format!("failed to read {}: {e}", entity.path().display()))
    })?;
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(PLAIN_CONTENT_TYPE))],
        Bytes::from(body),
    )
        .into_response())
}

// Re-export handler functions for use in router setup.
pub use entries::{
    handle_all_implementations, handle_all_specifications, handle_implementation_content,
    handle_implementations, handle_specification_content, handle_specifications,
};
pub use evaluate::handle_evaluate;
pub use interfaces::{handle_interface, handle_interfaces};
pub use status::{handle_neighbors, handle_overview, handle_status};
pub use sync::handle_sync;
