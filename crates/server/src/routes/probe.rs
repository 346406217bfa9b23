use axum::extract::rejection::JsonRejection;
use axum::Json;
use ck_core::reachability::{probe_all, DEFAULT_PROBE_TIMEOUT, DEFAULT_SSH_PORT};
use ck_protocol::ipc::{ProbeRequest, ProbeResult};

use crate::error::AppError;

/// Check which hosts accept connections on their SSH port.
pub async fn probe_hosts(
    request: Result<Json<ProbeRequest>, JsonRejection>,
) -> Result<Json<Vec<ProbeResult>>, AppError> {
    let Json(request) = request?;
    if request.hosts.is_empty() {
        return Err(AppError::BadRequest("No hosts to probe".to_string()));
    }

    let port = request.port.unwrap_or(DEFAULT_SSH_PORT);
    let results = probe_all(&request.hosts, port, DEFAULT_PROBE_TIMEOUT).await;
    Ok(Json(results))
}
