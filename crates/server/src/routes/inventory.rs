use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ck_core::inventory::generate_inventory;
use ck_protocol::inventory_models::InventoryRequest;
use ck_protocol::ipc::Reply;

use crate::error::AppError;
use crate::state::AppState;

/// Write the inventory tree for the submitted fleet.
pub async fn generate(
    State(state): State<AppState>,
    request: Result<Json<InventoryRequest>, JsonRejection>,
) -> Result<Json<Reply>, AppError> {
    let Json(request) = request?;
    let root = state.inventory_root.clone();

    tokio::task::spawn_blocking(move || generate_inventory(&root, &request))
        .await
        .map_err(|e| AppError::Internal(format!("Inventory generation task failed: {e}")))??;

    Ok(Json(Reply::success()))
}
