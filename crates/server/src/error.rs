use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ck_core::inventory::InventoryError;
use ck_core::supervisor::SupervisorError;
use ck_protocol::ipc::Reply;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
    Supervisor(SupervisorError),
    Inventory(InventoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            AppError::Supervisor(err) => match err {
                SupervisorError::Conflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
                SupervisorError::NotRunning => {
                    (StatusCode::CONFLICT, "not_running", err.to_string())
                }
                SupervisorError::Staging(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_credentials", err.to_string())
                }
                SupervisorError::Inventory(InventoryError::Missing { .. }) => {
                    (StatusCode::BAD_REQUEST, "inventory_missing", err.to_string())
                }
                SupervisorError::Inventory(_) => {
                    tracing::error!("Inventory error: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "inventory_error", err.to_string())
                }
            },
            AppError::Inventory(err) => match err {
                InventoryError::Invalid { .. } => {
                    (StatusCode::BAD_REQUEST, "invalid_inventory", err.to_string())
                }
                InventoryError::Missing { .. } => {
                    (StatusCode::BAD_REQUEST, "inventory_missing", err.to_string())
                }
                _ => {
                    tracing::error!("Inventory error: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "inventory_error", err.to_string())
                }
            },
        };

        (status, Json(Reply::error(error_type, message))).into_response()
    }
}

impl From<SupervisorError> for AppError {
    fn from(err: SupervisorError) -> Self {
        AppError::Supervisor(err)
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError::Inventory(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
