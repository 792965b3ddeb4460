//! Frame extractor - one still image per timestamp via ffmpeg.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::probe::validate_path;

/// Per-call extraction failures. Never fatal for the job: the orchestrator
/// logs the skip and moves on to the next timestamp.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("decode tool exited with {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("failed to invoke decode tool: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Narrow seam over the external media-decoding tool. The production
/// implementation shells out; tests substitute scripted behavior.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Seek to `timestamp_seconds` in `video_path` and write exactly one
    /// still image to `output_path`, overwriting if present.
    async fn extract(
        &self,
        video_path: &Path,
        timestamp_seconds: f64,
        output_path: &Path,
    ) -> Result<(), ExtractionError>;
}

/// Production extractor that shells out to ffmpeg.
pub struct FfmpegFrameExtractor {
    ffmpeg_path: String,
}

impl FfmpegFrameExtractor {
    pub fn new(ffmpeg_path: String) -> Result<Self, ExtractionError> {
        validate_path(&ffmpeg_path).map_err(ExtractionError::InvalidPath)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    #[tracing::instrument(skip(self, video_path, output_path), fields(
        process.command = %self.ffmpeg_path
    ))]
    async fn extract(
        &self,
        video_path: &Path,
        timestamp_seconds: f64,
        output_path: &Path,
    ) -> Result<(), ExtractionError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(video_path)
            .args(["-ss", &timestamp_seconds.to_string()])
            .args(["-vframes", "1"])
            .args(["-q:v", "2"])
            .arg("-y")
            .arg(output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExtractionError::ToolFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}
