//! /, /status, /neighbors handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use thoth_core::wire::{EntryDescriptor, NeighborsResponse, Overview, StatusResponse};

use super::{all_groups, internal, ApiState};

// ── / ───────────────────────────────────────────────────────────────────────

pub async fn handle_overview(
    State(state): State<ApiState>,
) -> Result<Json<Overview>, (StatusCode, String)> {
    let interfaces = state
        .catalog
        .interfaces
        .all()
        .await
        .map_err(internal)?
        .iter()
        .map(|i| EntryDescriptor::of(i.as_ref()))
        .collect();

    Ok(Json(Overview {
        interfaces,
        implementations: all_groups(&state.catalog.implementations).await?,
        specifications: all_groups(&state.catalog.specifications).await?,
    }))
}

// ── /status ───────────────────────────────────────────────────────────────────

pub async fn handle_status(
    State(state): State<ApiState>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let catalog = &state.catalog;
    Ok(Json(StatusResponse {
        catalog_root: catalog.root().display().to_string(),
        interfaces: catalog.interfaces.len().await.map_err(internal)?,
        implementations: catalog.implementations.len().await.map_err(internal)?,
        specifications: catalog.specifications.len().await.map_err(internal)?,
        neighbors: state.engine.peers().len(),
    }))
}

// ── /neighbors ────────────────────────────────────────────────────────────────

pub async fn handle_neighbors(State(state): State<ApiState>) -> Json<NeighborsResponse> {
    Json(NeighborsResponse {
        neighbors: state.engine.peers().iter().cloned().collect(),
    })
}
