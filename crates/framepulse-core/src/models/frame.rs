use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Aspect-ratio classification inferred from the probed resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum AspectClass {
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "4:3")]
    Standard4x3,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Vertical9x16,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "21:9")]
    Cinema21x9,
}

impl AspectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape16x9 => "16:9",
            AspectClass::Standard4x3 => "4:3",
            AspectClass::Square => "1:1",
            AspectClass::Vertical9x16 => "9:16",
            AspectClass::Portrait3x4 => "3:4",
            AspectClass::Cinema21x9 => "21:9",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "16:9" => Some(AspectClass::Landscape16x9),
            "4:3" => Some(AspectClass::Standard4x3),
            "1:1" => Some(AspectClass::Square),
            "9:16" => Some(AspectClass::Vertical9x16),
            "3:4" => Some(AspectClass::Portrait3x4),
            "21:9" => Some(AspectClass::Cinema21x9),
            _ => None,
        }
    }

    /// Classify a "WxH" resolution string by nearest aspect ratio.
    ///
    /// Matches within a 0.1 tolerance; anything missing, malformed, or with
    /// no close match falls back to 16:9.
    pub fn from_resolution(resolution: Option<&str>) -> Self {
        let Some(resolution) = resolution else {
            return AspectClass::Landscape16x9;
        };

        let mut parts = resolution.splitn(2, 'x');
        let width: f64 = match parts.next().and_then(|w| w.parse().ok()) {
            Some(w) => w,
            None => return AspectClass::Landscape16x9,
        };
        let height: f64 = match parts.next().and_then(|h| h.parse().ok()) {
            Some(h) if h > 0.0 => h,
            _ => return AspectClass::Landscape16x9,
        };

        let ratio = width / height;
        let candidates = [
            (AspectClass::Landscape16x9, 16.0 / 9.0),
            (AspectClass::Standard4x3, 4.0 / 3.0),
            (AspectClass::Square, 1.0),
            (AspectClass::Vertical9x16, 9.0 / 16.0),
            (AspectClass::Portrait3x4, 3.0 / 4.0),
            (AspectClass::Cinema21x9, 21.0 / 9.0),
        ];

        for (class, target) in candidates {
            if (ratio - target).abs() < 0.1 {
                return class;
            }
        }

        AspectClass::Landscape16x9
    }
}

/// One still image extracted from a video at a specific timestamp.
///
/// Owned by exactly one [`VideoJob`](super::VideoJob); never updated after
/// creation, destroyed by the video-deletion flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    pub video_id: Uuid,
    pub content_id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub storage_url: String,
    pub timestamp_seconds: i32,
    pub aspect: AspectClass,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FrameResponse {
    pub id: Uuid,
    pub video_id: Uuid,
    pub filename: String,
    pub url: String,
    pub timestamp_seconds: i32,
    pub aspect: AspectClass,
    pub created_at: DateTime<Utc>,
}

impl From<Frame> for FrameResponse {
    fn from(frame: Frame) -> Self {
        FrameResponse {
            id: frame.id,
            video_id: frame.video_id,
            filename: frame.filename,
            url: frame.storage_url,
            timestamp_seconds: frame.timestamp_seconds,
            aspect: frame.aspect,
            created_at: frame.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_classification_common_resolutions() {
        assert_eq!(
            AspectClass::from_resolution(Some("1920x1080")),
            AspectClass::Landscape16x9
        );
        assert_eq!(
            AspectClass::from_resolution(Some("640x480")),
            AspectClass::Standard4x3
        );
        assert_eq!(
            AspectClass::from_resolution(Some("1080x1080")),
            AspectClass::Square
        );
        assert_eq!(
            AspectClass::from_resolution(Some("1080x1920")),
            AspectClass::Vertical9x16
        );
        assert_eq!(
            AspectClass::from_resolution(Some("768x1024")),
            AspectClass::Portrait3x4
        );
        assert_eq!(
            AspectClass::from_resolution(Some("2560x1080")),
            AspectClass::Cinema21x9
        );
    }

    #[test]
    fn test_aspect_classification_fallback() {
        assert_eq!(AspectClass::from_resolution(None), AspectClass::Landscape16x9);
        assert_eq!(
            AspectClass::from_resolution(Some("garbage")),
            AspectClass::Landscape16x9
        );
        assert_eq!(
            AspectClass::from_resolution(Some("1920x0")),
            AspectClass::Landscape16x9
        );
        // An exotic ratio with no close match defaults to 16:9
        assert_eq!(
            AspectClass::from_resolution(Some("4000x1000")),
            AspectClass::Landscape16x9
        );
    }

    #[test]
    fn test_aspect_round_trip() {
        for class in [
            AspectClass::Landscape16x9,
            AspectClass::Standard4x3,
            AspectClass::Square,
            AspectClass::Vertical9x16,
            AspectClass::Portrait3x4,
            AspectClass::Cinema21x9,
        ] {
            assert_eq!(AspectClass::parse(class.as_str()), Some(class));
        }
        assert_eq!(AspectClass::parse("17:10"), None);
    }

    #[test]
    fn test_frame_response_from_frame() {
        let frame = Frame {
            id: Uuid::new_v4(),
            video_id: Uuid::new_v4(),
            content_id: Uuid::new_v4(),
            filename: "screenshot_2s.jpg".to_string(),
            storage_key: "frames/abc.jpg".to_string(),
            storage_url: "http://localhost:3000/media/frames/abc.jpg".to_string(),
            timestamp_seconds: 2,
            aspect: AspectClass::Landscape16x9,
            created_at: Utc::now(),
        };

        let response = FrameResponse::from(frame.clone());
        assert_eq!(response.id, frame.id);
        assert_eq!(response.video_id, frame.video_id);
        assert_eq!(response.filename, "screenshot_2s.jpg");
        assert_eq!(response.url, frame.storage_url);
        assert_eq!(response.timestamp_seconds, 2);
        assert_eq!(response.aspect, AspectClass::Landscape16x9);
    }
}
