use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Processing lifecycle of an uploaded video.
///
/// `uploading → processing → {completed, failed}`; the terminal states may
/// re-enter `processing` through a manual re-trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "job_state", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// Terminal states are only left through an explicit re-trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobState::Uploading => write!(f, "uploading"),
            JobState::Processing => write!(f, "processing"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// One uploaded video and its screenshot-extraction lifecycle.
///
/// `duration_ms` is 0 and `frame_rate`/`resolution` are unset until the
/// probe step has run; readers must tolerate partially-populated metadata
/// while the job is `processing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    pub id: Uuid,
    pub content_id: Uuid,
    pub original_filename: String,
    pub storage_key: String,
    pub storage_url: String,
    pub file_size: i64,
    pub duration_ms: i64,
    pub frame_rate: Option<i32>,
    pub resolution: Option<String>,
    pub screenshots_count: i32,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Background extraction task: a plain value consumed by the worker loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub video_id: Uuid,
    pub pulse_ms: i64,
}

/// Returned to the caller at ingestion; the pipeline itself reports nothing
/// back, progress is observed by polling status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestReceipt {
    pub video_id: Uuid,
    pub state: JobState,
}

/// Current lifecycle state plus whatever metadata has been populated so far.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobStatus {
    pub video_id: Uuid,
    pub state: JobState,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub screenshots_count: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoJob> for JobStatus {
    fn from(job: VideoJob) -> Self {
        JobStatus {
            video_id: job.id,
            state: job.state,
            duration_ms: job.duration_ms,
            frame_rate: job.frame_rate,
            resolution: job.resolution,
            screenshots_count: job.screenshots_count,
            updated_at: job.updated_at,
        }
    }
}

/// Outcome of a manual re-trigger request; rejected unless the job is in a
/// terminal state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RetriggerReceipt {
    pub video_id: Uuid,
    pub accepted: bool,
}
