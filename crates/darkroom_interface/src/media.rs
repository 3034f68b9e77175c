//! Media processing collaborators.

use async_trait::async_trait;
use darkroom_core::{Dimensions, Metadata, Orientation};
use darkroom_error::DarkroomResult;
use serde::{Deserialize, Serialize};

/// Reads structured metadata from raw bytes.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract metadata on a best-effort basis.
    ///
    /// Never fails: fields that cannot be determined are `Unknown`, and a
    /// missing or failing tool yields [`Metadata::degraded`].
    async fn extract(&self, bytes: &[u8], declared_mime: &str) -> Metadata;
}

/// What a [`Renderer`] should produce.
///
/// # Examples
///
/// ```
/// use darkroom_core::Orientation;
/// use darkroom_interface::RenderRequest;
///
/// let request = RenderRequest {
///     width: 200,
///     height: 200,
///     crop: true,
///     orientation: Orientation::Normal,
///     quality: 90,
/// };
/// assert!(request.crop);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Target width in upright pixels
    pub width: u32,
    /// Target height in upright pixels
    pub height: u32,
    /// Center-crop to fill the box instead of scaling to it
    pub crop: bool,
    /// Orientation the source is stored in; output is upright
    pub orientation: Orientation,
    /// JPEG quality
    pub quality: u8,
}

/// An encoded rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Encoded JPEG bytes
    pub bytes: Vec<u8>,
    /// Produced width
    pub width: u32,
    /// Produced height
    pub height: u32,
}

/// Produces scaled or cropped renditions of a still image.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `source` to the requested box.
    async fn render(&self, source: &[u8], request: &RenderRequest) -> DarkroomResult<Rendered>;
}

/// Result of probing a video container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProbe {
    /// Coded frame size of the first video stream
    pub dimensions: Dimensions,
    /// Display rotation
    pub orientation: Orientation,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Apple content identifier shared with the still half of a live photo
    pub content_id: Option<String>,
}

impl VideoProbe {
    /// Frame size as displayed.
    pub fn upright_dimensions(&self) -> Dimensions {
        self.orientation.apply(self.dimensions)
    }
}

/// Probes videos and extracts still frames.
#[async_trait]
pub trait VideoTool: Send + Sync {
    /// Inspect a video container.
    async fn probe(&self, bytes: &[u8]) -> DarkroomResult<VideoProbe>;

    /// Extract one representative still frame, encoded as JPEG.
    async fn extract_frame(&self, bytes: &[u8]) -> DarkroomResult<Vec<u8>>;
}
