//! Test fixtures for pipeline tests: canned probe/extractor implementations,
//! a scriptable frame store, and a fully wired in-memory pipeline.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use framepulse_core::models::{Frame, JobStatus};
use framepulse_core::AppError;
use framepulse_db::{FrameStore, InMemoryFrameStore, InMemoryVideoJobStore};
use framepulse_processing::{
    ExtractionError, FrameExtractor, ProbeError, Prober, ScreenshotOrchestrator,
    VideoIngestService, VideoProbe,
};
use framepulse_storage::{FileStore, LocalFileStore};
use framepulse_worker::{ExtractionContext, ExtractionQueue, QueueConfig};

/// Prober that returns canned metadata (or a canned failure) without
/// touching the file.
pub struct CannedProber {
    outcome: Option<VideoProbe>,
}

impl CannedProber {
    pub fn with_metadata(duration_ms: i64, frame_rate: i32, resolution: &str) -> Self {
        Self {
            outcome: Some(VideoProbe {
                duration_ms,
                frame_rate,
                resolution: resolution.to_string(),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { outcome: None }
    }
}

#[async_trait]
impl Prober for CannedProber {
    async fn probe(&self, _video_path: &Path) -> Result<VideoProbe, ProbeError> {
        match &self.outcome {
            Some(probe) => Ok(probe.clone()),
            None => Err(ProbeError::ToolFailed {
                code: Some(1),
                stderr: "canned probe failure".to_string(),
            }),
        }
    }
}

/// Extractor that writes a stub image, failing on scripted call indices and
/// recording the timestamps it was asked for. An optional gate lets tests
/// hold a job in flight.
pub struct ScriptedExtractor {
    fail_calls: HashSet<usize>,
    calls: AtomicUsize,
    timestamps: Mutex<Vec<f64>>,
    gate: Option<Arc<tokio::sync::Mutex<()>>>,
}

impl ScriptedExtractor {
    pub fn always_ok() -> Self {
        Self::failing_on([])
    }

    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_calls: calls.into_iter().collect(),
            calls: AtomicUsize::new(0),
            timestamps: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(gate: Arc<tokio::sync::Mutex<()>>) -> Self {
        Self {
            fail_calls: HashSet::new(),
            calls: AtomicUsize::new(0),
            timestamps: Mutex::new(Vec::new()),
            gate: Some(gate),
        }
    }

    pub fn seen_timestamps(&self) -> Vec<f64> {
        self.timestamps.lock().expect("timestamps lock").clone()
    }
}

#[async_trait]
impl FrameExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _video_path: &Path,
        timestamp_seconds: f64,
        output_path: &Path,
    ) -> Result<(), ExtractionError> {
        if let Some(gate) = &self.gate {
            let _open = gate.lock().await;
        }

        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.timestamps
            .lock()
            .expect("timestamps lock")
            .push(timestamp_seconds);

        if self.fail_calls.contains(&call) {
            return Err(ExtractionError::ToolFailed {
                code: Some(1),
                stderr: "scripted decode failure".to_string(),
            });
        }

        tokio::fs::write(output_path, b"\xFF\xD8\xFFstub-jpeg").await?;
        Ok(())
    }
}

/// Frame store that fails `create` on scripted call indices, delegating
/// everything else to an in-memory store.
pub struct FlakyFrameStore {
    inner: InMemoryFrameStore,
    fail_calls: HashSet<usize>,
    calls: AtomicUsize,
}

impl FlakyFrameStore {
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            inner: InMemoryFrameStore::new(),
            fail_calls: calls.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FrameStore for FlakyFrameStore {
    async fn create(&self, frame: Frame) -> Result<Frame, AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls.contains(&call) {
            return Err(AppError::Internal(
                "scripted record-store failure".to_string(),
            ));
        }
        self.inner.create(frame).await
    }

    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<Frame>, AppError> {
        self.inner.list_by_video(video_id).await
    }

    async fn delete_by_video(&self, video_id: Uuid) -> Result<u64, AppError> {
        self.inner.delete_by_video(video_id).await
    }
}

/// A fully wired pipeline over in-memory stores and a tempdir file store.
pub struct TestPipeline {
    pub service: VideoIngestService,
    pub jobs: Arc<InMemoryVideoJobStore>,
    pub frames: Arc<dyn FrameStore>,
    pub files: Arc<LocalFileStore>,
    pub orchestrator: Arc<ScreenshotOrchestrator>,
    _storage_dir: tempfile::TempDir,
}

pub async fn build_pipeline(
    prober: Arc<dyn Prober>,
    extractor: Arc<dyn FrameExtractor>,
    frames: Arc<dyn FrameStore>,
) -> TestPipeline {
    let storage_dir = tempfile::tempdir().expect("create storage dir");
    let files = Arc::new(
        LocalFileStore::new(
            storage_dir.path(),
            "http://localhost:3000/media".to_string(),
        )
        .await
        .expect("create file store"),
    );
    let jobs = Arc::new(InMemoryVideoJobStore::new());

    let orchestrator = Arc::new(ScreenshotOrchestrator::new(
        jobs.clone(),
        frames.clone(),
        files.clone() as Arc<dyn FileStore>,
        prober,
        extractor,
    ));
    let context: Arc<dyn ExtractionContext> = orchestrator.clone();
    let queue = ExtractionQueue::new(
        QueueConfig {
            max_concurrent_jobs: 2,
        },
        Arc::downgrade(&context),
    );

    let service = VideoIngestService::new(
        jobs.clone(),
        frames.clone(),
        files.clone() as Arc<dyn FileStore>,
        queue,
    );

    TestPipeline {
        service,
        jobs,
        frames,
        files,
        orchestrator,
        _storage_dir: storage_dir,
    }
}

pub async fn build_default_pipeline(
    prober: Arc<dyn Prober>,
    extractor: Arc<dyn FrameExtractor>,
) -> TestPipeline {
    build_pipeline(prober, extractor, Arc::new(InMemoryFrameStore::new())).await
}

/// Poll the job's status until it reaches a terminal state.
pub async fn wait_for_terminal(service: &VideoIngestService, video_id: Uuid) -> JobStatus {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = service.status(video_id).await.expect("status");
            if status.state.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time")
}
