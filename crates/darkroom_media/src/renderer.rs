//! Rendering with the `image` crate.

use async_trait::async_trait;
use darkroom_core::Orientation;
use darkroom_error::{DarkroomResult, RenderError, RenderErrorKind};
use darkroom_interface::{RenderRequest, Rendered, Renderer};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Decodes, orients, scales or crops and encodes JPEG.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderer {
    filter: FilterType,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageRenderer {
    /// Create a renderer with the default Lanczos3 filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different resampling filter.
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    fn render_blocking(
        source: &[u8],
        request: &RenderRequest,
        filter: FilterType,
    ) -> Result<Rendered, RenderError> {
        if request.width == 0 || request.height == 0 {
            return Err(RenderError::new(RenderErrorKind::InvalidTarget {
                width: request.width,
                height: request.height,
            }));
        }

        let decoded = image::load_from_memory(source)
            .map_err(|e| RenderError::new(RenderErrorKind::Decode(e.to_string())))?;
        let upright = orient(decoded, request.orientation);

        let resized = if request.crop {
            upright.resize_to_fill(request.width, request.height, filter)
        } else {
            upright.resize_exact(request.width, request.height, filter)
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, request.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| RenderError::new(RenderErrorKind::Encode(e.to_string())))?;

        Ok(Rendered {
            bytes,
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}

/// Apply an EXIF orientation so the image is upright.
fn orient(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::FlipHorizontal => image.fliph(),
        Orientation::Rotate180 => image.rotate180(),
        Orientation::FlipVertical => image.flipv(),
        Orientation::Transpose => image.rotate90().fliph(),
        Orientation::Rotate90 => image.rotate90(),
        Orientation::Transverse => image.rotate270().fliph(),
        Orientation::Rotate270 => image.rotate270(),
    }
}

#[async_trait]
impl Renderer for ImageRenderer {
    #[tracing::instrument(skip(self, source), fields(size = source.len(), width = request.width, height = request.height))]
    async fn render(&self, source: &[u8], request: &RenderRequest) -> DarkroomResult<Rendered> {
        let source = source.to_vec();
        let request = *request;
        let filter = self.filter;

        let rendered = tokio::task::spawn_blocking(move || {
            Self::render_blocking(&source, &request, filter)
        })
        .await
        .map_err(|e| RenderError::new(RenderErrorKind::Task(e.to_string())))??;

        tracing::debug!(
            width = rendered.width,
            height = rendered.height,
            size = rendered.bytes.len(),
            "Rendered variant"
        );
        Ok(rendered)
    }
}
