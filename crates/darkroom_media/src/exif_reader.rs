//! In-process EXIF parsing with kamadak-exif.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use darkroom_core::{Extracted, Metadata, Orientation};
use exif::{Exif, In, Tag, Value};
use std::io::Cursor;

/// Read the EXIF block of an image container.
///
/// Returns degraded metadata when there is no EXIF or it cannot be parsed.
pub(crate) fn read_exif(bytes: &[u8]) -> Metadata {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "No readable EXIF");
            return Metadata::degraded();
        }
    };

    let orientation = get_uint(&exif, Tag::Orientation).and_then(Orientation::from_exif);
    let taken = get_ascii(&exif, Tag::DateTimeOriginal).and_then(|datetime| {
        parse_taken_at(&datetime, get_ascii(&exif, Tag::OffsetTimeOriginal).as_deref())
    });
    let (taken_at, timezone) = match taken {
        Some((taken_at, timezone)) => (Extracted::Known(taken_at), timezone.into()),
        None => (Extracted::Unknown, Extracted::Unknown),
    };

    Metadata {
        orientation: orientation.into(),
        taken_at,
        timezone,
        make: get_ascii(&exif, Tag::Make).into(),
        model: get_ascii(&exif, Tag::Model).into(),
        lens: get_ascii(&exif, Tag::LensModel).into(),
        iso: get_uint(&exif, Tag::PhotographicSensitivity)
            .map(|iso| iso.to_string())
            .into(),
        aperture: get_rational(&exif, Tag::FNumber).map(format_aperture).into(),
        shutter: get_rational(&exif, Tag::ExposureTime)
            .and_then(format_shutter)
            .into(),
        focal: get_rational(&exif, Tag::FocalLength).map(format_focal).into(),
        ..Metadata::degraded()
    }
}

fn get_uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn get_rational(exif: &Exif, tag: Tag) -> Option<f64> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Rational(ref v) if !v.is_empty() && v[0].denom != 0 => Some(v[0].to_f64()),
            _ => None,
        })
}

fn get_ascii(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Ascii(ref v) if !v.is_empty() => {
                let text = String::from_utf8_lossy(&v[0]);
                let text = text.trim_matches(char::from(0)).trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            _ => None,
        })
}

/// `f/2.8`
pub(crate) fn format_aperture(f_number: f64) -> String {
    format!("f/{:.1}", f_number)
}

/// `1/250 s` below one second, `2 s` otherwise.
pub(crate) fn format_shutter(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    if seconds < 1.0 {
        Some(format!("1/{} s", (1.0 / seconds).round() as u64))
    } else {
        Some(format!("{} s", seconds))
    }
}

/// `16 mm`
pub(crate) fn format_focal(millimetres: f64) -> String {
    format!("{} mm", millimetres.round() as u64)
}

/// Parse an EXIF timestamp (`2023:05:01 14:30:00`) with an optional offset (`+02:00`).
///
/// Without an offset the timestamp is taken as UTC and no timezone is reported.
pub(crate) fn parse_taken_at(
    datetime: &str,
    offset: Option<&str>,
) -> Option<(DateTime<FixedOffset>, Option<String>)> {
    let naive = NaiveDateTime::parse_from_str(datetime.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    let parsed_offset = offset.and_then(|offset| {
        let offset = offset.trim();
        offset
            .parse::<FixedOffset>()
            .ok()
            .map(|parsed| (parsed, offset.to_string()))
    });
    match parsed_offset {
        Some((fixed, label)) => {
            let taken_at = naive.and_local_timezone(fixed).single()?;
            Some((taken_at, Some(label)))
        }
        None => Some((naive.and_utc().fixed_offset(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_camera_values() {
        assert_eq!(format_aperture(2.8), "f/2.8");
        assert_eq!(format_shutter(0.004).as_deref(), Some("1/250 s"));
        assert_eq!(format_shutter(2.0).as_deref(), Some("2 s"));
        assert_eq!(format_shutter(0.0), None);
        assert_eq!(format_focal(15.9), "16 mm");
    }

    #[test]
    fn test_parse_taken_at_with_offset() {
        let (taken_at, timezone) =
            parse_taken_at("2023:05:01 14:30:00", Some("+02:00")).unwrap();
        assert_eq!(taken_at.to_rfc3339(), "2023-05-01T14:30:00+02:00");
        assert_eq!(timezone.as_deref(), Some("+02:00"));
    }

    #[test]
    fn test_parse_taken_at_without_offset_is_utc() {
        let (taken_at, timezone) = parse_taken_at("2023:05:01 14:30:00", None).unwrap();
        assert_eq!(taken_at.to_rfc3339(), "2023-05-01T14:30:00+00:00");
        assert_eq!(timezone, None);
        assert!(parse_taken_at("0000:00:00 00:00:00", None).is_none());
    }

    #[test]
    fn test_non_exif_bytes_degrade() {
        assert!(read_exif(b"definitely not an image").is_degraded());
    }
}
