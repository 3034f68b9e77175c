//! Media type classification.

use serde::{Deserialize, Serialize};

/// Kind of media a record holds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image (JPEG, PNG, WebP, GIF, HEIC, ...)
    #[display("image")]
    Image,
    /// Video (MP4, QuickTime, WebM, ...)
    #[display("video")]
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "qt", "webm", "mkv", "avi", "mpg", "mpeg", "3gp", "ogv", "mts", "m2ts",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "tif", "tiff", "bmp", "avif",
];

impl MediaType {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Classify a declared MIME type.
    ///
    /// Returns `None` for anything that is neither `image/*` nor `video/*`,
    /// including `application/octet-stream`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else if mime.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    /// Classify by file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(MediaType::Image)
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    /// The opposite half of a live photo pair.
    pub fn counterpart(&self) -> Self {
        match self {
            MediaType::Image => MediaType::Video,
            MediaType::Video => MediaType::Image,
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            _ => Err(format!("Unknown media type: {}", s)),
        }
    }
}

/// Best guess of a MIME type for a file extension.
pub fn guess_mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "mp4" | "m4v" => "video/mp4",
        "mov" | "qt" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        "mts" | "m2ts" => "video/mp2t",
        _ => return None,
    };
    Some(mime)
}

/// Preferred file extension for a MIME type.
pub fn guess_extension(mime: &str) -> Option<&'static str> {
    let extension = match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/tiff" => "tif",
        "image/bmp" => "bmp",
        "image/avif" => "avif",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/x-msvideo" => "avi",
        "video/mpeg" => "mpg",
        "video/3gpp" => "3gp",
        "video/ogg" => "ogv",
        "video/mp2t" => "mts",
        _ => return None,
    };
    Some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_classification() {
        assert_eq!(MediaType::from_mime("image/jpeg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_mime("Video/QuickTime"), Some(MediaType::Video));
        assert_eq!(MediaType::from_mime("application/octet-stream"), None);
    }

    #[test]
    fn test_extension_classification() {
        assert_eq!(MediaType::from_extension("MOV"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("heic"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("txt"), None);
        assert_eq!(guess_mime_type("mp4"), Some("video/mp4"));
        assert_eq!(guess_extension("video/quicktime"), Some("mov"));
        assert_eq!(guess_extension("application/octet-stream"), None);
    }
}
