//! /specifications and /implementations handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use thoth_core::wire::{ImplementationList, SpecificationList};

use super::{all_groups, group_of, internal, not_found, raw_content, ApiState};

// ── /specifications ───────────────────────────────────────────────────────────

pub async fn handle_all_specifications(
    State(state): State<ApiState>,
) -> Result<Json<SpecificationList>, (StatusCode, String)> {
    let specifications = all_groups(&state.catalog.specifications).await?;
    Ok(Json(SpecificationList { specifications }))
}

/// Always one group, empty when the interface has no specifications.
pub async fn handle_specifications(
    State(state): State<ApiState>,
    Path(interface): Path<String>,
) -> Result<Json<SpecificationList>, (StatusCode, String)> {
    let group = group_of(&state.catalog.specifications, &interface).await?;
    Ok(Json(SpecificationList {
        specifications: vec![group],
    }))
}

pub async fn handle_specification_content(
    State(state): State<ApiState>,
    Path((interface, name)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let spec = state
        .catalog
        .specifications
        .find_by_interface_and_name(&interface, &name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("specification {interface}/{name}")))?;
    raw_content(spec.as_ref()).await
}

// ── /implementations ──────────────────────────────────────────────────────────

pub async fn handle_all_implementations(
    State(state): State<ApiState>,
) -> Result<Json<ImplementationList>, (StatusCode, String)> {
    let implementations = all_groups(&state.catalog.implementations).await?;
    Ok(Json(ImplementationList { implementations }))
}

pub async fn handle_implementations(
    State(state): State<ApiState>,
    Path(interface): Path<String>,
) -> Result<Json<ImplementationList>, (StatusCode, String)> {
    let group = group_of(&state.catalog.implementations, &interface).await?;
    Ok(Json(ImplementationList {
        implementations: vec![group],
    }))
}

pub async fn handle_implementation_content(
    State(state): State<ApiState>,
    Path((interface, name)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let implementation = state
        .catalog
        .implementations
        .find_by_interface_and_name(&interface, &name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("implementation {interface}/{name}")))?;
    raw_content(implementation.as_ref()).await
}
