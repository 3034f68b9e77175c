//! Video probing and frame extraction with ffprobe and ffmpeg.

use crate::process::run_tool;
use async_trait::async_trait;
use darkroom_core::{Dimensions, Orientation};
use darkroom_error::{DarkroomResult, VideoToolError, VideoToolErrorKind};
use darkroom_interface::{VideoProbe, VideoTool};
use serde::Deserialize;
use std::collections::HashMap;

const FFPROBE: &str = "ffprobe";
const FFMPEG: &str = "ffmpeg";

/// QuickTime metadata key carrying the live photo content identifier.
const CONTENT_IDENTIFIER_TAG: &str = "com.apple.quicktime.content.identifier";

/// Runs `ffprobe` and `ffmpeg` as child processes, feeding the video on stdin.
#[derive(Debug, Clone)]
pub struct FfmpegVideoTool {
    ffprobe: String,
    ffmpeg: String,
}

impl Default for FfmpegVideoTool {
    fn default() -> Self {
        Self {
            ffprobe: FFPROBE.to_string(),
            ffmpeg: FFMPEG.to_string(),
        }
    }
}

impl FfmpegVideoTool {
    /// Use `ffprobe` and `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit executable paths.
    pub fn with_executables(ffprobe: impl Into<String>, ffmpeg: impl Into<String>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<SideData>,
}

#[derive(Debug, Deserialize)]
struct SideData {
    rotation: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub(crate) fn parse_probe(stdout: &[u8]) -> Result<VideoProbe, VideoToolError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| {
        VideoToolError::new(VideoToolErrorKind::Parse {
            tool: FFPROBE.to_string(),
            message: e.to_string(),
        })
    })?;

    let stream = output
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VideoToolError::new(VideoToolErrorKind::NoVideoStream))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(width), Some(height)) => (width, height),
        _ => return Err(VideoToolError::new(VideoToolErrorKind::NoVideoStream)),
    };

    // Older builds report a `rotate` tag, newer ones a display matrix whose
    // rotation has the opposite sign.
    let orientation = stream
        .tags
        .get("rotate")
        .and_then(|rotate| rotate.trim().parse::<i64>().ok())
        .or_else(|| {
            stream
                .side_data_list
                .iter()
                .find_map(|side_data| side_data.rotation)
                .map(|rotation| -rotation)
        })
        .map(Orientation::from_rotation_degrees)
        .unwrap_or_default();

    let format = output.format.as_ref();
    let duration = format
        .and_then(|format| format.duration.as_deref())
        .and_then(|duration| duration.trim().parse::<f64>().ok());
    let content_id = format
        .and_then(|format| format.tags.get(CONTENT_IDENTIFIER_TAG))
        .or_else(|| stream.tags.get(CONTENT_IDENTIFIER_TAG))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(VideoProbe {
        dimensions: Dimensions::new(width, height),
        orientation,
        duration,
        content_id,
    })
}

#[async_trait]
impl VideoTool for FfmpegVideoTool {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn probe(&self, bytes: &[u8]) -> DarkroomResult<VideoProbe> {
        let stdout = run_tool(
            &self.ffprobe,
            &[
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
                "-",
            ],
            bytes,
        )
        .await?;
        let probe = parse_probe(&stdout)?;
        tracing::debug!(
            dimensions = %probe.dimensions,
            orientation = ?probe.orientation,
            has_content_id = probe.content_id.is_some(),
            "Probed video"
        );
        Ok(probe)
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn extract_frame(&self, bytes: &[u8]) -> DarkroomResult<Vec<u8>> {
        let frame = run_tool(
            &self.ffmpeg,
            &[
                "-v",
                "error",
                "-i",
                "-",
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "-",
            ],
            bytes,
        )
        .await?;
        if frame.is_empty() {
            return Err(VideoToolError::new(VideoToolErrorKind::NoVideoStream).into());
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_rotated_live_photo_video() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1920, "height": 1080,
                 "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]}
            ],
            "format": {
                "duration": "2.833",
                "tags": {"com.apple.quicktime.content.identifier": "E905E6C6"}
            }
        }"#;
        let probe = parse_probe(json).unwrap();

        assert_eq!(probe.dimensions, Dimensions::new(1920, 1080));
        assert_eq!(probe.orientation, Orientation::Rotate90);
        assert_eq!(probe.upright_dimensions(), Dimensions::new(1080, 1920));
        assert_eq!(probe.duration, Some(2.833));
        assert_eq!(probe.content_id.as_deref(), Some("E905E6C6"));
    }

    #[test]
    fn test_rotate_tag() {
        let json = br#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
            "tags": {"rotate": "180"}}]}"#;
        let probe = parse_probe(json).unwrap();
        assert_eq!(probe.orientation, Orientation::Rotate180);
        assert_eq!(probe.content_id, None);
    }

    #[test]
    fn test_missing_video_stream() {
        let err = parse_probe(br#"{"streams": [{"codec_type": "audio"}]}"#).unwrap_err();
        assert_eq!(err.kind(), &VideoToolErrorKind::NoVideoStream);
    }
}
