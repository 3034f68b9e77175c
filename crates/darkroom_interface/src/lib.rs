//! Trait definitions for the Darkroom media derivation pipeline.
//!
//! The pipeline never talks to image libraries, external tools or the
//! database directly. It consumes these traits, which makes every stage
//! testable with in-memory fakes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod media;
mod repository;

pub use media::{MetadataExtractor, RenderRequest, Rendered, Renderer, VideoProbe, VideoTool};
pub use repository::MediaRepository;
