//! Extraction queue: worker loop, bounded job concurrency, and submission.
//!
//! Jobs are plain values ([`ExtractionJob`]) pushed onto an in-process
//! channel. The worker loop dispatches each job under a semaphore so at most
//! `max_concurrent_jobs` pipelines run at once; extraction within a single
//! job stays sequential inside the pipeline itself. Once submitted, a job
//! runs to completion or failure — there is no cancellation, no retry, and
//! no return channel to the submitter.

use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Semaphore};

use framepulse_core::models::ExtractionJob;
use framepulse_core::AppError;

use crate::context::ExtractionContext;

#[derive(Clone)]
pub struct QueueConfig {
    pub max_concurrent_jobs: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
        }
    }
}

pub struct ExtractionQueue {
    job_tx: mpsc::UnboundedSender<ExtractionJob>,
    shutdown_tx: mpsc::Sender<()>,
}

impl ExtractionQueue {
    /// Create a new ExtractionQueue with a weak reference to the dispatch
    /// context and spawn its worker loop.
    pub fn new(config: QueueConfig, context: Weak<dyn ExtractionContext>) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            Self::worker_loop(config, context, job_rx, shutdown_rx).await;
        });

        Self {
            job_tx,
            shutdown_tx,
        }
    }

    /// Submit a job for background execution. Returns as soon as the job is
    /// enqueued; progress is observable only through the job's status record.
    pub fn submit(&self, job: ExtractionJob) -> Result<(), AppError> {
        let video_id = job.video_id;
        let pulse_ms = job.pulse_ms;
        self.job_tx
            .send(job)
            .map_err(|_| AppError::Internal("Extraction queue is not running".to_string()))?;

        tracing::info!(
            video_id = %video_id,
            pulse_ms = pulse_ms,
            "Extraction job submitted to queue"
        );
        Ok(())
    }

    async fn worker_loop(
        config: QueueConfig,
        context: Weak<dyn ExtractionContext>,
        mut job_rx: mpsc::UnboundedReceiver<ExtractionJob>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(
            max_concurrent_jobs = config.max_concurrent_jobs,
            "Extraction worker loop started"
        );

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Extraction worker loop shutting down");
                    break;
                }
                job = job_rx.recv() => {
                    let Some(job) = job else {
                        tracing::info!("Extraction queue closed, worker loop stopping");
                        break;
                    };

                    // Waiting here bounds how many pipelines run at once;
                    // further submissions stay queued on the channel.
                    let permit = match semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };

                    let ctx = context.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        let Some(ctx) = ctx.upgrade() else {
                            tracing::warn!(
                                video_id = %job.video_id,
                                "Extraction context was dropped, discarding job"
                            );
                            return;
                        };

                        if let Err(e) = ctx.run_extraction(&job).await {
                            tracing::error!(
                                video_id = %job.video_id,
                                error = %e,
                                "Extraction job failed"
                            );
                        }
                    });
                }
            }
        }

        tracing::info!("Extraction worker loop stopped");
    }

    pub async fn shutdown(&self) {
        tracing::info!("Initiating extraction queue shutdown");
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl Clone for ExtractionQueue {
    fn clone(&self) -> Self {
        Self {
            job_tx: self.job_tx.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    struct RecordingContext {
        running: AtomicUsize,
        max_running: AtomicUsize,
        completed: AtomicUsize,
    }

    impl RecordingContext {
        fn new() -> Self {
            Self {
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExtractionContext for RecordingContext {
        async fn run_extraction(&self, _job: &ExtractionJob) -> anyhow::Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn job() -> ExtractionJob {
        ExtractionJob {
            video_id: Uuid::new_v4(),
            pulse_ms: 1000,
        }
    }

    async fn wait_for_completed(ctx: &RecordingContext, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while ctx.completed.load(Ordering::SeqCst) < expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("jobs did not complete in time");
    }

    #[tokio::test]
    async fn test_submitted_jobs_run() {
        let ctx = Arc::new(RecordingContext::new());
        let weak = Arc::downgrade(&ctx) as Weak<dyn ExtractionContext>;
        let queue = ExtractionQueue::new(QueueConfig::default(), weak);

        for _ in 0..3 {
            queue.submit(job()).unwrap();
        }

        wait_for_completed(&ctx, 3).await;
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let ctx = Arc::new(RecordingContext::new());
        let weak = Arc::downgrade(&ctx) as Weak<dyn ExtractionContext>;
        let queue = ExtractionQueue::new(
            QueueConfig {
                max_concurrent_jobs: 1,
            },
            weak,
        );

        for _ in 0..4 {
            queue.submit(job()).unwrap();
        }

        wait_for_completed(&ctx, 4).await;
        assert_eq!(ctx.max_running.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_context_discards_jobs() {
        let ctx = Arc::new(RecordingContext::new());
        let weak = Arc::downgrade(&ctx) as Weak<dyn ExtractionContext>;
        let queue = ExtractionQueue::new(QueueConfig::default(), weak);

        drop(ctx);
        // Submission still succeeds; the job is discarded by the worker.
        queue.submit(job()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatch() {
        let ctx = Arc::new(RecordingContext::new());
        let weak = Arc::downgrade(&ctx) as Weak<dyn ExtractionContext>;
        let queue = ExtractionQueue::new(QueueConfig::default(), weak);

        queue.shutdown().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The worker loop is gone, so submission is rejected.
        assert!(queue.submit(job()).is_err());
        assert_eq!(ctx.completed.load(Ordering::SeqCst), 0);
    }
}
