//! Ingestion entry point: accept an upload, persist it, schedule extraction.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use framepulse_core::models::{
    ExtractionJob, FrameResponse, IngestReceipt, JobState, JobStatus, RetriggerReceipt, VideoJob,
};
use framepulse_core::AppError;
use framepulse_db::{FrameStore, VideoJobStore};
use framepulse_storage::FileStore;
use framepulse_worker::ExtractionQueue;

use crate::lifecycle::LifecycleTracker;
use crate::schedule::clamp_pulse;

fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Lowercased alphanumeric extension of the original filename, if it has one.
fn file_extension(filename: &str) -> Option<String> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

/// Front door of the pipeline, plus the synchronous operations the CRUD
/// layer drives: status polling, manual re-trigger, deletion, frame listing.
///
/// Ingestion runs inside the request context and must not block on
/// extraction: it persists the upload, creates the job record, and enqueues
/// the background run before returning. Failures after that point are never
/// surfaced to the ingestion caller.
pub struct VideoIngestService {
    jobs: Arc<dyn VideoJobStore>,
    frames: Arc<dyn FrameStore>,
    files: Arc<dyn FileStore>,
    queue: ExtractionQueue,
    tracker: LifecycleTracker,
}

impl VideoIngestService {
    pub fn new(
        jobs: Arc<dyn VideoJobStore>,
        frames: Arc<dyn FrameStore>,
        files: Arc<dyn FileStore>,
        queue: ExtractionQueue,
    ) -> Self {
        let tracker = LifecycleTracker::new(jobs.clone());
        Self {
            jobs,
            frames,
            files,
            queue,
            tracker,
        }
    }

    /// Accept a video payload, write it to durable storage, create the job
    /// record, and schedule the extraction pipeline without blocking.
    #[tracing::instrument(skip(self, payload), fields(content_id = %content_id, size = payload.len()))]
    pub async fn ingest(
        &self,
        content_id: Uuid,
        payload: Vec<u8>,
        original_filename: &str,
        pulse_ms: Option<i64>,
    ) -> Result<IngestReceipt, AppError> {
        if payload.is_empty() {
            return Err(AppError::InvalidInput(
                "Video payload is empty".to_string(),
            ));
        }

        let video_id = Uuid::new_v4();
        let stored_name = match file_extension(original_filename) {
            Some(ext) => format!("{}.{}", video_id, ext),
            None => video_id.to_string(),
        };
        let storage_key = format!("videos/{}", stored_name);
        let file_size = payload.len() as i64;

        let storage_url = self
            .files
            .put(&storage_key, payload)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::info!(video_id = %video_id, storage_key = %storage_key, "Video saved to storage");

        let now = Utc::now();
        let job = VideoJob {
            id: video_id,
            content_id,
            original_filename: sanitize_filename(original_filename),
            storage_key: storage_key.clone(),
            storage_url,
            file_size,
            duration_ms: 0,
            frame_rate: None,
            resolution: None,
            screenshots_count: 0,
            state: JobState::Uploading,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.jobs.create(job).await {
            // The upload is unreachable without its record; reclaim the file.
            if let Err(cleanup) = self.files.delete(&storage_key).await {
                tracing::debug!(
                    storage_key = %storage_key,
                    error = %cleanup,
                    "Failed to clean up storage file after record-store error"
                );
            }
            return Err(e);
        }

        self.tracker.mark_processing(video_id).await?;

        let pulse_ms = clamp_pulse(pulse_ms);
        self.queue.submit(ExtractionJob { video_id, pulse_ms })?;

        tracing::info!(video_id = %video_id, pulse_ms = pulse_ms, "Video ingested, extraction scheduled");

        Ok(IngestReceipt {
            video_id,
            state: JobState::Processing,
        })
    }

    /// Current lifecycle state and populated metadata for a job.
    pub async fn status(&self, video_id: Uuid) -> Result<JobStatus, AppError> {
        self.tracker.status(video_id).await
    }

    /// Manually re-run extraction for an existing job, optionally with a
    /// different pulse. Accepted only from a terminal state; a job still in
    /// flight keeps its current run.
    #[tracing::instrument(skip(self), fields(video_id = %video_id))]
    pub async fn retrigger(
        &self,
        video_id: Uuid,
        pulse_ms: Option<i64>,
    ) -> Result<RetriggerReceipt, AppError> {
        let job = self
            .jobs
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video job {} not found", video_id)))?;

        if !job.state.is_terminal() {
            tracing::warn!(
                video_id = %video_id,
                state = %job.state,
                "Re-trigger rejected: job is not in a terminal state"
            );
            return Ok(RetriggerReceipt {
                video_id,
                accepted: false,
            });
        }

        self.tracker.mark_processing(video_id).await?;

        let pulse_ms = clamp_pulse(pulse_ms);
        self.queue.submit(ExtractionJob { video_id, pulse_ms })?;

        tracing::info!(video_id = %video_id, pulse_ms = pulse_ms, "Extraction re-triggered");

        Ok(RetriggerReceipt {
            video_id,
            accepted: true,
        })
    }

    /// List the frames extracted for a job, ordered by timestamp.
    pub async fn frames(&self, video_id: Uuid) -> Result<Vec<FrameResponse>, AppError> {
        self.jobs
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video job {} not found", video_id)))?;

        let frames = self.frames.list_by_video(video_id).await?;
        Ok(frames.into_iter().map(FrameResponse::from).collect())
    }

    /// Delete a job, its frame records, and (best-effort) their files.
    ///
    /// File deletion failures are logged and ignored; record deletion
    /// failures propagate.
    #[tracing::instrument(skip(self), fields(video_id = %video_id))]
    pub async fn delete_job(&self, video_id: Uuid) -> Result<(), AppError> {
        let job = self
            .jobs
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video job {} not found", video_id)))?;

        if let Err(e) = self.files.delete(&job.storage_key).await {
            tracing::warn!(
                video_id = %video_id,
                storage_key = %job.storage_key,
                error = %e,
                "Failed to delete video file"
            );
        }

        let frames = self.frames.list_by_video(video_id).await?;
        for frame in &frames {
            if let Err(e) = self.files.delete(&frame.storage_key).await {
                tracing::debug!(
                    video_id = %video_id,
                    storage_key = %frame.storage_key,
                    error = %e,
                    "Failed to delete frame file"
                );
            }
        }

        self.frames.delete_by_video(video_id).await?;
        self.jobs.delete(video_id).await?;

        tracing::info!(
            video_id = %video_id,
            frame_count = frames.len(),
            "Video job and frames deleted"
        );

        Ok(())
    }
}
