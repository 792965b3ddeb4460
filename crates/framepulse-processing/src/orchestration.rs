//! Extraction orchestration: fetch → probe → schedule → extract → persist.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use framepulse_core::models::{AspectClass, ExtractionJob, Frame, VideoJob};
use framepulse_db::{FrameStore, VideoJobStore};
use framepulse_storage::FileStore;
use framepulse_worker::ExtractionContext;

use crate::extract::FrameExtractor;
use crate::lifecycle::LifecycleTracker;
use crate::probe::Prober;
use crate::schedule::schedule;

/// Drives the full sequence of scheduled timestamps for one video job,
/// isolating per-timestamp failure.
///
/// A probe failure marks the job failed and stops; anything that goes wrong
/// for a single timestamp (decode, storage, or frame-record persistence) is
/// logged and skipped. The job completes with however many frames survived,
/// including zero.
pub struct ScreenshotOrchestrator {
    jobs: Arc<dyn VideoJobStore>,
    frames: Arc<dyn FrameStore>,
    files: Arc<dyn FileStore>,
    prober: Arc<dyn Prober>,
    extractor: Arc<dyn FrameExtractor>,
    tracker: LifecycleTracker,
}

impl ScreenshotOrchestrator {
    pub fn new(
        jobs: Arc<dyn VideoJobStore>,
        frames: Arc<dyn FrameStore>,
        files: Arc<dyn FileStore>,
        prober: Arc<dyn Prober>,
        extractor: Arc<dyn FrameExtractor>,
    ) -> Self {
        let tracker = LifecycleTracker::new(jobs.clone());
        Self {
            jobs,
            frames,
            files,
            prober,
            extractor,
            tracker,
        }
    }

    /// Run the pipeline for a video: fetch from storage, probe, schedule,
    /// extract frame by frame, then transition to the final state.
    pub async fn run(&self, video_id: Uuid, pulse_ms: i64) -> Result<()> {
        tracing::info!(video_id = %video_id, pulse_ms = pulse_ms, "Starting screenshot extraction");

        let job: VideoJob = self
            .jobs
            .get(video_id)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .context("Video job not found")?;

        let temp_dir = TempDir::new().context("Failed to create temp directory")?;

        let input_name = Path::new(&job.storage_key)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "input.bin".to_string());
        let input_path = temp_dir.path().join(input_name);

        // An unreadable source file fails the job the same way a failed
        // probe does: nothing can be extracted from it.
        let probe = async {
            let video_data = self
                .files
                .get(&job.storage_key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to fetch video from storage: {}", e))?;
            tokio::fs::write(&input_path, video_data)
                .await
                .context("Failed to write video to temp file")?;

            self.prober
                .probe(&input_path)
                .await
                .context("Failed to probe video")
        }
        .await;

        let probe = match probe {
            Ok(probe) => probe,
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Probe failed, marking job failed");
                self.tracker
                    .mark_failed(video_id)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to mark job failed: {}", e))?;
                return Err(e);
            }
        };

        self.jobs
            .set_probe_metadata(video_id, probe.duration_ms, probe.frame_rate, &probe.resolution)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to persist probed metadata: {}", e))?;

        tracing::info!(
            video_id = %video_id,
            duration_ms = probe.duration_ms,
            frame_rate = probe.frame_rate,
            resolution = %probe.resolution,
            "Video metadata extracted"
        );

        let timestamps = schedule(probe.duration_ms, pulse_ms);
        let aspect = AspectClass::from_resolution(Some(&probe.resolution));

        tracing::info!(
            video_id = %video_id,
            scheduled = timestamps.len(),
            "Extracting screenshots"
        );

        // One decode process at a time; a bad frame never aborts the job.
        let mut produced: i32 = 0;
        for (index, timestamp) in timestamps.iter().enumerate() {
            match self
                .capture_frame(&job, &input_path, temp_dir.path(), *timestamp, aspect)
                .await
            {
                Ok(()) => {
                    produced += 1;
                    tracing::debug!(
                        video_id = %video_id,
                        frame = index + 1,
                        total = timestamps.len(),
                        timestamp_seconds = timestamp,
                        "Screenshot saved"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        video_id = %video_id,
                        timestamp_seconds = timestamp,
                        error = %e,
                        "Failed to extract screenshot, continuing"
                    );
                }
            }
        }

        self.tracker
            .mark_completed(video_id, produced)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to mark job completed: {}", e))?;

        tracing::info!(
            video_id = %video_id,
            produced = produced,
            scheduled = timestamps.len(),
            "Screenshot extraction completed"
        );

        Ok(())
    }

    /// Extract one frame and persist it: decode to a scratch file, store the
    /// bytes durably, create the frame record. Any failure along the way is
    /// this frame's failure alone.
    async fn capture_frame(
        &self,
        job: &VideoJob,
        input_path: &Path,
        scratch_dir: &Path,
        timestamp_seconds: f64,
        aspect: AspectClass,
    ) -> Result<()> {
        let frame_id = Uuid::new_v4();
        let stored_name = format!("{}.jpg", frame_id);
        let scratch_path = scratch_dir.join(&stored_name);

        self.extractor
            .extract(input_path, timestamp_seconds, &scratch_path)
            .await
            .context("Decode failed")?;

        let frame_data = tokio::fs::read(&scratch_path)
            .await
            .context("Failed to read extracted frame")?;

        let storage_key = format!("frames/{}", stored_name);
        let storage_url = self
            .files
            .put(&storage_key, frame_data)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store frame: {}", e))?;

        let display_seconds = timestamp_seconds.round() as i32;
        let frame = Frame {
            id: frame_id,
            video_id: job.id,
            content_id: job.content_id,
            filename: format!("screenshot_{}s.jpg", display_seconds),
            storage_key: storage_key.clone(),
            storage_url,
            timestamp_seconds: display_seconds,
            aspect,
            created_at: Utc::now(),
        };

        if let Err(e) = self.frames.create(frame).await {
            // The stored file has no record pointing at it; reclaim it.
            if let Err(cleanup) = self.files.delete(&storage_key).await {
                tracing::debug!(
                    storage_key = %storage_key,
                    error = %cleanup,
                    "Failed to clean up orphaned frame file"
                );
            }
            return Err(anyhow::anyhow!("Failed to persist frame record: {}", e));
        }

        Ok(())
    }
}

#[async_trait]
impl ExtractionContext for ScreenshotOrchestrator {
    async fn run_extraction(&self, job: &ExtractionJob) -> Result<()> {
        self.run(job.video_id, job.pulse_ms).await
    }
}
