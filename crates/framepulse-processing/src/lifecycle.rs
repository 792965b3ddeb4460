//! Video lifecycle tracker - owns the job's processing-state transitions.

use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::{JobState, JobStatus};
use framepulse_core::AppError;
use framepulse_db::VideoJobStore;

/// State machine: `uploading → processing → {completed, failed}`, with
/// `processing` re-enterable from either terminal state via a manual
/// re-trigger. Each transition updates the job's state and timestamp in one
/// write; a failed transition leaves the record untouched.
#[derive(Clone)]
pub struct LifecycleTracker {
    jobs: Arc<dyn VideoJobStore>,
}

impl LifecycleTracker {
    pub fn new(jobs: Arc<dyn VideoJobStore>) -> Self {
        Self { jobs }
    }

    pub async fn mark_processing(&self, video_id: Uuid) -> Result<(), AppError> {
        self.jobs.set_state(video_id, JobState::Processing).await
    }

    pub async fn mark_completed(
        &self,
        video_id: Uuid,
        screenshots_count: i32,
    ) -> Result<(), AppError> {
        self.jobs.set_completed(video_id, screenshots_count).await
    }

    pub async fn mark_failed(&self, video_id: Uuid) -> Result<(), AppError> {
        self.jobs.set_state(video_id, JobState::Failed).await
    }

    /// Current state plus whatever metadata has been populated so far;
    /// callers must tolerate partially-populated metadata while the job is
    /// still `processing`.
    pub async fn status(&self, video_id: Uuid) -> Result<JobStatus, AppError> {
        let job = self
            .jobs
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video job {} not found", video_id)))?;
        Ok(JobStatus::from(job))
    }
}
