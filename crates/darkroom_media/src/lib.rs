//! Concrete media collaborators for the Darkroom pipeline.
//!
//! - [`NativeMetadataExtractor`] reads image headers and EXIF in-process and
//!   optionally asks `exiftool` for live photo identifiers and video metadata.
//! - [`ImageRenderer`] decodes, orients, scales or crops and encodes JPEG with
//!   the `image` crate on the blocking pool.
//! - [`FfmpegVideoTool`] probes videos with `ffprobe` and grabs a still frame
//!   with `ffmpeg`.
//!
//! External tools are fed through stdin, so nothing touches temporary files.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod exif_reader;
mod exiftool;
mod extractor;
mod ffmpeg;
mod process;
mod renderer;

pub use extractor::NativeMetadataExtractor;
pub use ffmpeg::FfmpegVideoTool;
pub use renderer::ImageRenderer;
