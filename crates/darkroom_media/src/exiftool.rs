//! Metadata from the external `exiftool` binary.

use crate::exif_reader::{format_aperture, format_focal, format_shutter, parse_taken_at};
use crate::process::run_tool;
use darkroom_core::{Dimensions, Extracted, MediaType, Metadata, Orientation};
use darkroom_error::{VideoToolError, VideoToolErrorKind};
use serde_json::{Map, Value};

const EXIFTOOL: &str = "exiftool";

/// Run `exiftool -j -n -` over `bytes`.
pub(crate) async fn run_exiftool(
    bytes: &[u8],
    media_type: Option<MediaType>,
) -> Result<Metadata, VideoToolError> {
    let stdout = run_tool(EXIFTOOL, &["-j", "-n", "-"], bytes).await?;
    parse_exiftool_json(&stdout, media_type)
}

/// Map exiftool's numeric JSON output onto [`Metadata`].
pub(crate) fn parse_exiftool_json(
    stdout: &[u8],
    media_type: Option<MediaType>,
) -> Result<Metadata, VideoToolError> {
    let parse_error = |message: String| {
        VideoToolError::new(VideoToolErrorKind::Parse {
            tool: EXIFTOOL.to_string(),
            message,
        })
    };
    let value: Value = serde_json::from_slice(stdout).map_err(|e| parse_error(e.to_string()))?;
    let tags = value
        .as_array()
        .and_then(|entries| entries.first())
        .and_then(Value::as_object)
        .ok_or_else(|| parse_error("expected a JSON array with one object".to_string()))?;

    let width = get_u64(tags, "ImageWidth");
    let height = get_u64(tags, "ImageHeight");
    let dimensions = match (width, height) {
        (Some(w), Some(h)) => Extracted::Known(Dimensions::new(w as u32, h as u32)),
        _ => Extracted::Unknown,
    };

    let orientation = match media_type {
        Some(MediaType::Video) => get_i64(tags, "Rotation").map(Orientation::from_rotation_degrees),
        _ => get_u64(tags, "Orientation").and_then(|v| Orientation::from_exif(v as u32)),
    };

    let taken = match get_str(tags, "DateTimeOriginal") {
        Some(datetime) => parse_taken_at(&datetime, get_str(tags, "OffsetTimeOriginal").as_deref()),
        None => get_str(tags, "CreationDate").and_then(|datetime| parse_quicktime_date(&datetime)),
    };
    let (taken_at, timezone) = match taken {
        Some((taken_at, timezone)) => (Extracted::Known(taken_at), timezone.into()),
        None => (Extracted::Unknown, Extracted::Unknown),
    };

    Ok(Metadata {
        mime_type: get_str(tags, "MIMEType").into(),
        dimensions,
        orientation: orientation.into(),
        taken_at,
        timezone,
        make: get_str(tags, "Make").into(),
        model: get_str(tags, "Model").into(),
        lens: get_str(tags, "LensModel").into(),
        iso: get_u64(tags, "ISO").map(|iso| iso.to_string()).into(),
        aperture: get_f64(tags, "FNumber").map(format_aperture).into(),
        shutter: get_f64(tags, "ExposureTime").and_then(format_shutter).into(),
        focal: get_f64(tags, "FocalLength").map(format_focal).into(),
        live_photo_content_id: get_str(tags, "ContentIdentifier")
            .or_else(|| get_str(tags, "MediaGroupUUID"))
            .into(),
        micro_video_offset: get_u64(tags, "MicroVideoOffset")
            .filter(|offset| *offset > 0)
            .into(),
    })
}

/// QuickTime `CreationDate`, e.g. `2023:05:01 14:30:00+02:00`.
fn parse_quicktime_date(
    value: &str,
) -> Option<(chrono::DateTime<chrono::FixedOffset>, Option<String>)> {
    let value = value.trim();
    if value.len() > 19 {
        let (datetime, offset) = value.split_at(19);
        parse_taken_at(datetime, Some(offset))
    } else {
        parse_taken_at(value, None)
    }
}

fn get_str(tags: &Map<String, Value>, key: &str) -> Option<String> {
    match tags.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn get_f64(tags: &Map<String, Value>, key: &str) -> Option<f64> {
    match tags.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn get_u64(tags: &Map<String, Value>, key: &str) -> Option<u64> {
    get_f64(tags, key)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

fn get_i64(tags: &Map<String, Value>, key: &str) -> Option<i64> {
    get_f64(tags, key).map(|v| v.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_live_photo_still() {
        let json = br#"[{
            "SourceFile": "-",
            "MIMEType": "image/heic",
            "ImageWidth": 4032,
            "ImageHeight": 3024,
            "Orientation": 6,
            "Make": "Apple",
            "Model": "iPhone 13",
            "ISO": 50,
            "FNumber": 1.6,
            "ExposureTime": 0.0083,
            "FocalLength": 5.1,
            "DateTimeOriginal": "2022:08:14 19:02:11",
            "OffsetTimeOriginal": "+02:00",
            "ContentIdentifier": "E905E6C6-C747-4E8B-B6F2-A3C5D5B9A6E1"
        }]"#;
        let metadata = parse_exiftool_json(json, Some(MediaType::Image)).unwrap();

        assert_eq!(
            metadata.dimensions.known(),
            Some(&Dimensions::new(4032, 3024))
        );
        assert_eq!(metadata.orientation.known(), Some(&Orientation::Rotate90));
        assert_eq!(metadata.upright_dimensions(), Some(Dimensions::new(3024, 4032)));
        assert_eq!(metadata.aperture.known().map(String::as_str), Some("f/1.6"));
        assert_eq!(metadata.shutter.known().map(String::as_str), Some("1/120 s"));
        assert_eq!(metadata.timezone.known().map(String::as_str), Some("+02:00"));
        assert_eq!(
            metadata.live_photo_content_id.known().map(String::as_str),
            Some("E905E6C6-C747-4E8B-B6F2-A3C5D5B9A6E1")
        );
    }

    #[test]
    fn test_parses_video_rotation_and_creation_date() {
        let json = br#"[{
            "MIMEType": "video/quicktime",
            "ImageWidth": 1920,
            "ImageHeight": 1080,
            "Rotation": 90,
            "CreationDate": "2022:08:14 19:02:11+02:00",
            "ContentIdentifier": "E905E6C6"
        }]"#;
        let metadata = parse_exiftool_json(json, Some(MediaType::Video)).unwrap();

        assert_eq!(metadata.upright_dimensions(), Some(Dimensions::new(1080, 1920)));
        assert_eq!(metadata.timezone.known().map(String::as_str), Some("+02:00"));
    }

    #[test]
    fn test_motion_photo_offset() {
        let json = br#"[{"MIMEType": "image/jpeg", "MicroVideoOffset": 1048576}]"#;
        let metadata = parse_exiftool_json(json, Some(MediaType::Image)).unwrap();
        assert_eq!(metadata.micro_video_offset.known(), Some(&1_048_576));
    }

    #[test]
    fn test_rejects_unexpected_output() {
        assert!(parse_exiftool_json(b"{}", None).is_err());
        assert!(parse_exiftool_json(b"not json", None).is_err());
    }
}
