//! Shared application state handed to every handler.

use std::sync::Arc;

use framepulse_core::Config;
use framepulse_processing::{ScreenshotOrchestrator, VideoIngestService};
use framepulse_worker::ExtractionQueue;

pub struct AppState {
    pub config: Config,
    pub ingest: VideoIngestService,
    /// The queue only holds a weak reference to the pipeline; this strong
    /// reference keeps it alive for the lifetime of the application.
    pub pipeline: Arc<ScreenshotOrchestrator>,
    pub queue: ExtractionQueue,
}
