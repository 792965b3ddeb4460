use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::RetriggerReceipt;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RetriggerQuery {
    #[serde(default)]
    pub pulse_ms: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v0/videos/{id}/retrigger",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video job id"),
        ("pulse_ms" = Option<i64>, Query, description = "Sampling interval in milliseconds, clamped to [100, 300000]; defaults to 1000")
    ),
    responses(
        (status = 200, description = "Whether the re-trigger was accepted", body = RetriggerReceipt),
        (status = 404, description = "Video job not found", body = ErrorResponse)
    )
)]
pub async fn retrigger_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RetriggerQuery>,
) -> Result<Json<RetriggerReceipt>, HttpAppError> {
    let receipt = state.ingest.retrigger(id, query.pulse_ms).await?;
    Ok(Json(receipt))
}
