//! Dispatch seam between the queue and the extraction pipeline.
//!
//! The queue holds a weak reference to the context so the worker loop never
//! keeps the application state alive on its own.

use async_trait::async_trait;
use framepulse_core::models::ExtractionJob;

/// Runs one extraction job to completion.
#[async_trait]
pub trait ExtractionContext: Send + Sync {
    async fn run_extraction(&self, job: &ExtractionJob) -> anyhow::Result<()>;
}
