//! Store traits: the record-store seam the pipeline works against.
//!
//! The orchestrator and ingestion service only see these traits, so tests
//! can run the full pipeline against the in-memory implementations while
//! production wires in the Postgres repositories.

use async_trait::async_trait;
use framepulse_core::models::{Frame, JobState, VideoJob};
use framepulse_core::AppError;
use uuid::Uuid;

/// Persistence operations for [`VideoJob`] records.
///
/// State-mutating operations update the record's `updated_at` timestamp
/// atomically with the change and fail with `NotFound` when the job no
/// longer exists.
#[async_trait]
pub trait VideoJobStore: Send + Sync {
    /// Insert a new job record. Fails on id collision.
    async fn create(&self, job: VideoJob) -> Result<VideoJob, AppError>;

    /// Fetch a job by id.
    async fn get(&self, id: Uuid) -> Result<Option<VideoJob>, AppError>;

    /// List all jobs owned by a content record, newest first.
    async fn list_by_content(&self, content_id: Uuid) -> Result<Vec<VideoJob>, AppError>;

    /// Transition the job's lifecycle state.
    async fn set_state(&self, id: Uuid, state: JobState) -> Result<(), AppError>;

    /// Persist probed technical metadata onto the job.
    async fn set_probe_metadata(
        &self,
        id: Uuid,
        duration_ms: i64,
        frame_rate: i32,
        resolution: &str,
    ) -> Result<(), AppError>;

    /// Transition to `completed` and record the number of screenshots the
    /// finished run produced, in one update.
    async fn set_completed(&self, id: Uuid, screenshots_count: i32) -> Result<(), AppError>;

    /// Delete the job record.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Persistence operations for [`Frame`] records.
#[async_trait]
pub trait FrameStore: Send + Sync {
    /// Insert a new frame record. Frames are never updated after creation.
    async fn create(&self, frame: Frame) -> Result<Frame, AppError>;

    /// List all frames of a video job, ordered by timestamp.
    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<Frame>, AppError>;

    /// Delete all frames of a video job; returns the number removed.
    async fn delete_by_video(&self, video_id: Uuid) -> Result<u64, AppError>;
}
