//! Best-effort metadata extraction results.
//!
//! Every field carries its own "unknown" state so a tool that is missing or
//! fails never gets confused with a real zero.

use crate::{Dimensions, Orientation};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A metadata field that may not have been determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extracted<T> {
    /// The value was read from the media
    Known(T),
    /// The extractor could not determine the value
    Unknown,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Extracted::Unknown
    }
}

impl<T> Extracted<T> {
    /// Borrow the value if known.
    pub fn known(&self) -> Option<&T> {
        match self {
            Extracted::Known(value) => Some(value),
            Extracted::Unknown => None,
        }
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Extracted::Known(value) => Some(value),
            Extracted::Unknown => None,
        }
    }

    /// Whether a value was determined.
    pub fn is_known(&self) -> bool {
        matches!(self, Extracted::Known(_))
    }

    /// Keep this value if known, otherwise take `other`.
    pub fn or(self, other: Extracted<T>) -> Extracted<T> {
        match self {
            Extracted::Known(_) => self,
            Extracted::Unknown => other,
        }
    }

    /// Transform a known value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        match self {
            Extracted::Known(value) => Extracted::Known(f(value)),
            Extracted::Unknown => Extracted::Unknown,
        }
    }
}

impl<T> From<Option<T>> for Extracted<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Extracted::Known(value),
            None => Extracted::Unknown,
        }
    }
}

/// Camera fields, formatted for display (`f/2.8`, `16 mm`, `1/250 s`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Camera manufacturer
    pub make: Option<String>,
    /// Camera model
    pub model: Option<String>,
    /// Lens description
    pub lens: Option<String>,
    /// ISO sensitivity
    pub iso: Option<String>,
    /// Aperture
    pub aperture: Option<String>,
    /// Exposure time
    pub shutter: Option<String>,
    /// Focal length
    pub focal: Option<String>,
}

/// Structured metadata about one upload.
///
/// `Metadata::default()` is the fully degraded result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// MIME type sniffed from content, when it differs from or refines the declared one
    pub mime_type: Extracted<String>,
    /// Pixel dimensions as stored (before applying orientation)
    pub dimensions: Extracted<Dimensions>,
    /// EXIF orientation or video rotation
    pub orientation: Extracted<Orientation>,
    /// Capture timestamp; UTC when no offset was recorded
    pub taken_at: Extracted<DateTime<FixedOffset>>,
    /// Offset the capture timestamp was recorded in (`+02:00`)
    pub timezone: Extracted<String>,
    /// Camera manufacturer
    pub make: Extracted<String>,
    /// Camera model
    pub model: Extracted<String>,
    /// Lens description
    pub lens: Extracted<String>,
    /// ISO sensitivity
    pub iso: Extracted<String>,
    /// Aperture
    pub aperture: Extracted<String>,
    /// Exposure time
    pub shutter: Extracted<String>,
    /// Focal length
    pub focal: Extracted<String>,
    /// Content identifier shared by the halves of a live photo
    pub live_photo_content_id: Extracted<String>,
    /// Length in bytes of a video appended to a motion photo still
    pub micro_video_offset: Extracted<u64>,
}

impl Metadata {
    /// The result returned when extraction is unavailable or failed.
    pub fn degraded() -> Self {
        Self::default()
    }

    /// Whether nothing at all could be determined.
    pub fn is_degraded(&self) -> bool {
        *self == Self::default()
    }

    /// Dimensions as displayed upright, or `None` when unknown or zero.
    ///
    /// Unknown and zero are treated alike: neither allows scaling decisions.
    pub fn upright_dimensions(&self) -> Option<Dimensions> {
        let stored = *self.dimensions.known()?;
        if stored.is_degenerate() {
            return None;
        }
        let orientation = self.orientation.known().copied().unwrap_or_default();
        Some(orientation.apply(stored))
    }

    /// Fill every unknown field from `fallback`.
    pub fn merge(self, fallback: Metadata) -> Metadata {
        Metadata {
            mime_type: self.mime_type.or(fallback.mime_type),
            dimensions: self.dimensions.or(fallback.dimensions),
            orientation: self.orientation.or(fallback.orientation),
            taken_at: self.taken_at.or(fallback.taken_at),
            timezone: self.timezone.or(fallback.timezone),
            make: self.make.or(fallback.make),
            model: self.model.or(fallback.model),
            lens: self.lens.or(fallback.lens),
            iso: self.iso.or(fallback.iso),
            aperture: self.aperture.or(fallback.aperture),
            shutter: self.shutter.or(fallback.shutter),
            focal: self.focal.or(fallback.focal),
            live_photo_content_id: self
                .live_photo_content_id
                .or(fallback.live_photo_content_id),
            micro_video_offset: self.micro_video_offset.or(fallback.micro_video_offset),
        }
    }

    /// Camera fields for the record.
    pub fn camera(&self) -> CameraInfo {
        CameraInfo {
            make: self.make.known().cloned(),
            model: self.model.known().cloned(),
            lens: self.lens.known().cloned(),
            iso: self.iso.known().cloned(),
            aperture: self.aperture.known().cloned(),
            shutter: self.shutter.known().cloned(),
            focal: self.focal.known().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_are_unknown() {
        let metadata = Metadata {
            dimensions: Extracted::Known(Dimensions::new(0, 0)),
            ..Metadata::degraded()
        };
        assert_eq!(metadata.upright_dimensions(), None);
        assert_eq!(Metadata::degraded().upright_dimensions(), None);
    }

    #[test]
    fn test_upright_dimensions_follow_orientation() {
        let metadata = Metadata {
            dimensions: Extracted::Known(Dimensions::new(1512, 2016)),
            orientation: Extracted::Known(Orientation::Rotate270),
            ..Metadata::degraded()
        };
        assert_eq!(metadata.upright_dimensions(), Some(Dimensions::new(2016, 1512)));
    }

    #[test]
    fn test_merge_keeps_known_fields() {
        let primary = Metadata {
            make: Extracted::Known("Canon".to_string()),
            ..Metadata::degraded()
        };
        let fallback = Metadata {
            make: Extracted::Known("Nikon".to_string()),
            live_photo_content_id: Extracted::Known("E905E6C6".to_string()),
            ..Metadata::degraded()
        };
        let merged = primary.merge(fallback);
        assert_eq!(merged.make.known().map(String::as_str), Some("Canon"));
        assert!(merged.live_photo_content_id.is_known());
        assert!(!merged.is_degraded());
    }
}
