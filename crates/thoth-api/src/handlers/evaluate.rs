//! POST /evaluate/{interface} — run the interface's specifications.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use thoth_core::wire::EvaluationResponse;

use super::{internal, not_found, ApiState};

pub async fn handle_evaluate(
    State(state): State<ApiState>,
    Path(interface): Path<String>,
) -> Result<Json<EvaluationResponse>, (StatusCode, String)> {
    let known = state
        .catalog
        .interfaces
        .find_by_interface_and_name(&interface, &interface)
        .await
        .map_err(internal)?
        .is_some();
    if !known {
        return Err(not_found(format!("interface {interface}")));
    }

    let response = state
        .runner
        .evaluate_interface(&state.catalog.specifications, &interface)
        .await
        .map_err(internal)?;
    Ok(Json(response))
}
