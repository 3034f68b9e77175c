//! Best-effort metadata extraction.

use crate::exif_reader::read_exif;
use crate::exiftool::run_exiftool;
use async_trait::async_trait;
use darkroom_core::{Capabilities, Dimensions, MediaType, Metadata};
use darkroom_interface::MetadataExtractor;
use image::ImageReader;
use std::io::Cursor;

/// Reads image headers and EXIF in-process, then fills gaps from `exiftool`
/// when that capability is enabled.
#[derive(Debug, Clone, Copy)]
pub struct NativeMetadataExtractor {
    capabilities: Capabilities,
}

impl NativeMetadataExtractor {
    /// Create an extractor honouring `capabilities`.
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// Dimensions and format from the image header.
    fn read_header(bytes: &[u8]) -> Metadata {
        let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
            Ok(reader) => reader,
            Err(_) => return Metadata::degraded(),
        };
        let mime_type = reader
            .format()
            .map(|format| format.to_mime_type().to_string());
        let dimensions = reader
            .into_dimensions()
            .ok()
            .map(|(width, height)| Dimensions::new(width, height));
        Metadata {
            mime_type: mime_type.into(),
            dimensions: dimensions.into(),
            ..Metadata::degraded()
        }
    }
}

#[async_trait]
impl MetadataExtractor for NativeMetadataExtractor {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn extract(&self, bytes: &[u8], declared_mime: &str) -> Metadata {
        let media_type = MediaType::from_mime(declared_mime);

        let native = if media_type == Some(MediaType::Video) {
            Metadata::degraded()
        } else {
            let owned = bytes.to_vec();
            match tokio::task::spawn_blocking(move || {
                Self::read_header(&owned).merge(read_exif(&owned))
            })
            .await
            {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(error = %e, "Header parsing task failed");
                    Metadata::degraded()
                }
            }
        };

        if !self.capabilities.exiftool {
            return native;
        }

        match run_exiftool(bytes, media_type).await {
            Ok(external) => native.merge(external),
            Err(e) => {
                tracing::warn!(error = %e, "exiftool failed, using in-process metadata only");
                native
            }
        }
    }
}
