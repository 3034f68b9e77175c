//! Availability of optional external tools.

use serde::{Deserialize, Serialize};

/// An optional external tool the pipeline can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Capability {
    /// `exiftool` for maker notes, live photo identifiers and video metadata
    #[display("Exiftool")]
    ExifTool,
    /// `ffprobe`/`ffmpeg` for video probing and frame extraction
    #[display("FFmpeg")]
    FFmpeg,
}

/// Capability flags, injected into the extractor, factory and resolver.
///
/// Branches that depend on a tool check these flags instead of waiting for the
/// tool invocation to fail, so "disabled" and "failed" stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Whether exiftool may be invoked
    #[serde(default = "enabled")]
    pub exiftool: bool,
    /// Whether ffprobe/ffmpeg may be invoked
    #[serde(default = "enabled")]
    pub ffmpeg: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            exiftool: true,
            ffmpeg: true,
        }
    }
}

impl Capabilities {
    /// No external tools at all.
    pub fn none() -> Self {
        Self {
            exiftool: false,
            ffmpeg: false,
        }
    }

    /// Whether `capability` is enabled.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::ExifTool => self.exiftool,
            Capability::FFmpeg => self.ffmpeg,
        }
    }
}
