//! Metadata probe - duration, frame rate, and resolution via ffprobe.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

/// Technical metadata of a stored video file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub duration_ms: i64,
    pub frame_rate: i32,
    pub resolution: String,
}

/// Probe failures are fatal for the job: the pipeline stops and the job is
/// marked failed without attempting extraction.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe tool exited with {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    #[error("unparseable probe report: {0}")]
    Unparseable(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("failed to invoke probe tool: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Narrow seam over the external media-inspection tool. The production
/// implementation shells out; tests substitute canned metadata.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, video_path: &Path) -> Result<VideoProbe, ProbeError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<(), String> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(format!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Evaluate a frame-rate expression: either a ratio like "30000/1001" or a
/// plain number like "25".
fn eval_rate_expression(expr: &str) -> Option<f64> {
    if let Some((num, den)) = expr.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        expr.parse().ok()
    }
}

/// Parse the JSON report produced by `ffprobe -print_format json
/// -show_format -show_streams`.
///
/// The first stream with `codec_type == "video"` supplies frame rate and
/// resolution; the container format supplies the duration. A missing
/// duration is treated as 0 and a missing or degenerate frame rate falls
/// back to 30; only structural problems (bad JSON, no video stream,
/// missing dimensions) fail the probe.
pub fn parse_probe_report(raw: &[u8]) -> Result<VideoProbe, ProbeError> {
    let report: Value =
        serde_json::from_slice(raw).map_err(|e| ProbeError::Unparseable(e.to_string()))?;

    let stream = report["streams"]
        .as_array()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s["codec_type"].as_str() == Some("video"))
        })
        .ok_or(ProbeError::NoVideoStream)?;

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| ProbeError::Unparseable("missing stream width".to_string()))?;
    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| ProbeError::Unparseable("missing stream height".to_string()))?;

    let frame_rate = stream["r_frame_rate"]
        .as_str()
        .and_then(eval_rate_expression)
        .filter(|rate| *rate > 0.0)
        .map(|rate| rate.round() as i32)
        .unwrap_or(30);

    let duration_seconds = report["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoProbe {
        duration_ms: (duration_seconds * 1000.0).round() as i64,
        frame_rate,
        resolution: format!("{}x{}", width, height),
    })
}

/// Production prober that shells out to ffprobe.
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String) -> Result<Self, ProbeError> {
        validate_path(&ffprobe_path).map_err(ProbeError::InvalidPath)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    #[tracing::instrument(skip(self, video_path), fields(
        process.command = %self.ffprobe_path,
        video.path = %video_path.display()
    ))]
    async fn probe(&self, video_path: &Path) -> Result<VideoProbe, ProbeError> {
        validate_path(&video_path.to_string_lossy()).map_err(ProbeError::InvalidPath)?;

        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let probe = parse_probe_report(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            video_duration_ms = probe.duration_ms,
            frame_rate = probe.frame_rate,
            resolution = %probe.resolution,
            "Video probe completed"
        );

        Ok(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(streams: &str, format: &str) -> Vec<u8> {
        format!(r#"{{"streams": {}, "format": {}}}"#, streams, format).into_bytes()
    }

    #[test]
    fn test_parse_full_report() {
        let raw = report(
            r#"[{"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"}]"#,
            r#"{"duration": "5.005", "format_name": "mov,mp4"}"#,
        );

        let probe = parse_probe_report(&raw).expect("parse");
        assert_eq!(probe.duration_ms, 5005);
        assert_eq!(probe.frame_rate, 30);
        assert_eq!(probe.resolution, "1920x1080");
    }

    #[test]
    fn test_parse_plain_frame_rate() {
        let raw = report(
            r#"[{"codec_type": "video", "width": 640, "height": 480, "r_frame_rate": "25"}]"#,
            r#"{"duration": "1.0"}"#,
        );
        assert_eq!(parse_probe_report(&raw).unwrap().frame_rate, 25);
    }

    #[test]
    fn test_parse_frame_rate_fallback() {
        // Missing, malformed, and zero-denominator rates all fall back to 30
        for rate in [r#""0/0""#, r#""abc""#, "null"] {
            let raw = report(
                &format!(
                    r#"[{{"codec_type": "video", "width": 640, "height": 480, "r_frame_rate": {}}}]"#,
                    rate
                ),
                r#"{"duration": "1.0"}"#,
            );
            assert_eq!(parse_probe_report(&raw).unwrap().frame_rate, 30);
        }
    }

    #[test]
    fn test_parse_missing_duration_is_zero() {
        let raw = report(
            r#"[{"codec_type": "video", "width": 640, "height": 480, "r_frame_rate": "24/1"}]"#,
            r#"{"format_name": "mov,mp4"}"#,
        );
        assert_eq!(parse_probe_report(&raw).unwrap().duration_ms, 0);
    }

    #[test]
    fn test_parse_no_video_stream() {
        let raw = report(
            r#"[{"codec_type": "audio", "codec_name": "mp3"}]"#,
            r#"{"duration": "10.0"}"#,
        );
        assert!(matches!(
            parse_probe_report(&raw),
            Err(ProbeError::NoVideoStream)
        ));
    }

    #[test]
    fn test_parse_garbage_output() {
        assert!(matches!(
            parse_probe_report(b"not json at all"),
            Err(ProbeError::Unparseable(_))
        ));
    }

    #[test]
    fn test_parse_missing_dimensions() {
        let raw = report(
            r#"[{"codec_type": "video", "r_frame_rate": "30/1"}]"#,
            r#"{"duration": "2.0"}"#,
        );
        assert!(matches!(
            parse_probe_report(&raw),
            Err(ProbeError::Unparseable(_))
        ));
    }

    #[test]
    fn test_duration_rounding() {
        let raw = report(
            r#"[{"codec_type": "video", "width": 100, "height": 100, "r_frame_rate": "30/1"}]"#,
            r#"{"duration": "2.0006"}"#,
        );
        assert_eq!(parse_probe_report(&raw).unwrap().duration_ms, 2001);
    }

    #[test]
    fn test_prober_rejects_dangerous_tool_path() {
        assert!(FfprobeProber::new("ffprobe; rm -rf /".to_string()).is_err());
        assert!(FfprobeProber::new("/usr/bin/ffprobe".to_string()).is_ok());
    }
}
