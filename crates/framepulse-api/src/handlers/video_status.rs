use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::JobStatus;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/videos/{id}/status",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video job id")
    ),
    responses(
        (status = 200, description = "Current processing state and metadata", body = JobStatus),
        (status = 404, description = "Video job not found", body = ErrorResponse)
    )
)]
pub async fn video_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatus>, HttpAppError> {
    let status = state.ingest.status(id).await?;
    Ok(Json(status))
}
