use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::FrameResponse;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/videos/{id}/frames",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video job id")
    ),
    responses(
        (status = 200, description = "Extracted frames, ordered by timestamp", body = [FrameResponse]),
        (status = 404, description = "Video job not found", body = ErrorResponse)
    )
)]
pub async fn list_frames(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FrameResponse>>, HttpAppError> {
    let frames = state.ingest.frames(id).await?;
    Ok(Json(frames))
}
