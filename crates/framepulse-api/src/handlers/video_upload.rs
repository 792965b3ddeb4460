use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::IngestReceipt;
use framepulse_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> HttpAppError {
    HttpAppError(AppError::InvalidInput(format!(
        "Invalid multipart payload: {}",
        err
    )))
}

#[utoipa::path(
    post,
    path = "/api/v0/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video accepted, extraction scheduled", body = IngestReceipt),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn ingest_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IngestReceipt>, HttpAppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut content_id: Option<Uuid> = None;
    let mut pulse_ms: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(invalid_multipart)?;
                file = Some((filename, data.to_vec()));
            }
            "content_id" => {
                let raw = field.text().await.map_err(invalid_multipart)?;
                content_id = Some(raw.trim().parse().map_err(|_| {
                    AppError::InvalidInput(format!("content_id must be a UUID, got: {}", raw))
                })?);
            }
            "pulse_ms" => {
                let raw = field.text().await.map_err(invalid_multipart)?;
                pulse_ms = Some(raw.trim().parse().map_err(|_| {
                    AppError::InvalidInput(format!("pulse_ms must be an integer, got: {}", raw))
                })?);
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;
    let content_id =
        content_id.ok_or_else(|| AppError::InvalidInput("Missing 'content_id' field".to_string()))?;

    let receipt = state
        .ingest
        .ingest(content_id, data, &filename, pulse_ms)
        .await?;

    Ok(Json(receipt))
}
