//! /interfaces, /interfaces/{name} handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use thoth_core::wire::{EntryDescriptor, InterfaceList};

use super::{internal, not_found, raw_content, wants_json, ApiState};

pub async fn handle_interfaces(
    State(state): State<ApiState>,
) -> Result<Json<InterfaceList>, (StatusCode, String)> {
    let interfaces = state
        .catalog
        .interfaces
        .all()
        .await
        .map_err(internal)?
        .iter()
        .map(|i| EntryDescriptor::of(i.as_ref()))
        .collect();
    Ok(Json(InterfaceList { interfaces }))
}

/// Descriptor for `Accept: application/json`, raw definition otherwise.
pub async fn handle_interface(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let interface = state
        .catalog
        .interfaces
        .find_by_interface_and_name(&name, &name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("interface {name}")))?;

    if wants_json(&headers) {
        Ok(Json(EntryDescriptor::of(interface.as_ref())).into_response())
    } else {
        raw_content(interface.as_ref()).await
    }
}
