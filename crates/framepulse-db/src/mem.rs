//! In-memory store implementations.
//!
//! Used by pipeline and API tests so the full ingestion flow runs without a
//! database. Semantics mirror the Postgres repositories: duplicate-id
//! rejection on create, NotFound on updates against missing records,
//! read-after-write visibility.

use async_trait::async_trait;
use chrono::Utc;
use framepulse_core::models::{Frame, JobState, VideoJob};
use framepulse_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::traits::{FrameStore, VideoJobStore};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Video job {} not found", id))
}

/// In-memory [`VideoJobStore`].
#[derive(Clone, Default)]
pub struct InMemoryVideoJobStore {
    jobs: Arc<Mutex<HashMap<Uuid, VideoJob>>>,
}

impl InMemoryVideoJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoJobStore for InMemoryVideoJobStore {
    async fn create(&self, job: VideoJob) -> Result<VideoJob, AppError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(AppError::InvalidInput(format!(
                "Video job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<VideoJob>, AppError> {
        Ok(self.jobs.lock().await.get(&id).cloned())
    }

    async fn list_by_content(&self, content_id: Uuid) -> Result<Vec<VideoJob>, AppError> {
        let jobs = self.jobs.lock().await;
        let mut matched: Vec<VideoJob> = jobs
            .values()
            .filter(|j| j.content_id == content_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn set_state(&self, id: Uuid, state: JobState) -> Result<(), AppError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&id).ok_or_else(|| not_found(id))?;
        job.state = state;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_probe_metadata(
        &self,
        id: Uuid,
        duration_ms: i64,
        frame_rate: i32,
        resolution: &str,
    ) -> Result<(), AppError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&id).ok_or_else(|| not_found(id))?;
        job.duration_ms = duration_ms;
        job.frame_rate = Some(frame_rate);
        job.resolution = Some(resolution.to_string());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_completed(&self, id: Uuid, screenshots_count: i32) -> Result<(), AppError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&id).ok_or_else(|| not_found(id))?;
        job.state = JobState::Completed;
        job.screenshots_count = screenshots_count;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut jobs = self.jobs.lock().await;
        jobs.remove(&id).ok_or_else(|| not_found(id))?;
        Ok(())
    }
}

/// In-memory [`FrameStore`].
#[derive(Clone, Default)]
pub struct InMemoryFrameStore {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl InMemoryFrameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FrameStore for InMemoryFrameStore {
    async fn create(&self, frame: Frame) -> Result<Frame, AppError> {
        let mut frames = self.frames.lock().await;
        if frames.iter().any(|f| f.id == frame.id) {
            return Err(AppError::InvalidInput(format!(
                "Frame {} already exists",
                frame.id
            )));
        }
        frames.push(frame.clone());
        Ok(frame)
    }

    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<Frame>, AppError> {
        let frames = self.frames.lock().await;
        let mut matched: Vec<Frame> = frames
            .iter()
            .filter(|f| f.video_id == video_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.timestamp_seconds
                .cmp(&b.timestamp_seconds)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(matched)
    }

    async fn delete_by_video(&self, video_id: Uuid) -> Result<u64, AppError> {
        let mut frames = self.frames.lock().await;
        let before = frames.len();
        frames.retain(|f| f.video_id != video_id);
        Ok((before - frames.len()) as u64)
    }
}
