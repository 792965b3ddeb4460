//! Video ingestion and screenshot-extraction pipeline.
//!
//! The pipeline accepts an uploaded video, probes its technical metadata,
//! computes a deterministic sampling schedule, extracts one still per sample
//! point with an external decoding tool, persists each successful frame, and
//! tracks the job's lifecycle — tolerating per-frame failure without
//! aborting the run.

pub mod extract;
pub mod ingest;
pub mod lifecycle;
pub mod orchestration;
pub mod probe;
pub mod schedule;

pub use extract::{ExtractionError, FfmpegFrameExtractor, FrameExtractor};
pub use ingest::VideoIngestService;
pub use lifecycle::LifecycleTracker;
pub use orchestration::ScreenshotOrchestrator;
pub use probe::{FfprobeProber, ProbeError, Prober, VideoProbe};
pub use schedule::{clamp_pulse, schedule, DEFAULT_PULSE_MS, MAX_PULSE_MS, MIN_PULSE_MS};
