use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/v0/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video job id")
    ),
    responses(
        (status = 204, description = "Video job, frame records, and files deleted"),
        (status = 404, description = "Video job not found", body = ErrorResponse)
    )
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.ingest.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
