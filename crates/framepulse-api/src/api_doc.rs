//! OpenAPI document for the video ingestion surface.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use framepulse_core::models::{
    AspectClass, FrameResponse, IngestReceipt, JobState, JobStatus, RetriggerReceipt,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::video_upload::ingest_video,
        handlers::video_status::video_status,
        handlers::video_retrigger::retrigger_video,
        handlers::video_frames::list_frames,
        handlers::video_delete::delete_video,
    ),
    components(schemas(
        IngestReceipt,
        JobStatus,
        JobState,
        RetriggerReceipt,
        FrameResponse,
        AspectClass,
        ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video ingestion and screenshot extraction")
    )
)]
pub struct ApiDoc;
