//! Run control endpoints.
//!
//! `/deploy` and `/uninstall` answer with the run's events as NDJSON, one
//! JSON object per line, for as long as the run lasts.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ck_core::supervisor::EventStream;
use ck_protocol::ipc::{Credentials, Reply};
use ck_protocol::run_models::{InstallKind, RunSnapshot};
use tokio_stream::StreamExt;

use crate::error::AppError;
use crate::state::AppState;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

pub async fn get_status(State(state): State<AppState>) -> Json<RunSnapshot> {
    Json(state.supervisor.snapshot())
}

pub async fn deploy(
    State(state): State<AppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, AppError> {
    start_run(&state, InstallKind::Install, credentials).await
}

pub async fn uninstall(
    State(state): State<AppState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, AppError> {
    start_run(&state, InstallKind::Uninstall, credentials).await
}

pub async fn abort(State(state): State<AppState>) -> Result<Json<Reply>, AppError> {
    state.supervisor.abort()?;
    Ok(Json(Reply::status("aborting")))
}

async fn start_run(
    state: &AppState,
    kind: InstallKind,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(credentials) = credentials?;
    tracing::info!(%kind, username = %credentials.username, "Run requested");

    let events = state.supervisor.start(kind, credentials).await?;
    Ok(ndjson_response(events))
}

fn ndjson_response(mut events: EventStream) -> Response {
    let body = async_stream::stream! {
        while let Some(event) = events.next().await {
            match event.to_ndjson() {
                Ok(line) => yield Ok::<_, Infallible>(line),
                Err(e) => tracing::error!("Failed to serialize {} event: {}", event.kind(), e),
            }
        }
    };

    (
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}
