//! POST /sync — pull missing entries from neighbors.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use thoth_core::report::SyncReport;
use thoth_core::wire::SyncRequest;
use thoth_services::{SyncError, SyncTarget};

use super::{internal, ApiState};

/// An empty body syncs every interface.
pub async fn handle_sync(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<SyncReport>, (StatusCode, String)> {
    let request: SyncRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid sync request: {e}")))?
    };

    let target = SyncTarget::from(request.interface);
    tracing::info!(request = ?target, "sync requested");

    match state.engine.sync(target).await {
        Ok(report) => Ok(Json(report)),
        Err(e @ SyncError::InvalidName(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => Err(internal(e)),
    }
}
