//! Upload pipeline: extract, pair, derive.

use crate::{PairingResolver, PipelineContext, SizeVariantFactory, Upload};
use darkroom_core::{
    Capability, DiagnosticCategory, MediaRecord, MediaType, RecordId, SizeVariant,
};
use darkroom_error::DarkroomResult;
use darkroom_storage::extension_of;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A stored record together with all of its size variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedMedia {
    /// The record the upload ended up in
    pub record: MediaRecord,
    /// Its variants, smallest first
    pub variants: Vec<SizeVariant>,
}

/// Runs one upload through extraction, pairing and variant creation.
#[derive(Debug, Clone)]
pub struct Ingestor {
    context: PipelineContext,
    resolver: PairingResolver,
}

impl Ingestor {
    /// Create an ingestor.
    pub fn new(context: PipelineContext) -> Self {
        let resolver = PairingResolver::new(context.clone());
        Self { context, resolver }
    }

    /// Ingest one file.
    ///
    /// Only a failure to store the original (or to reach the repository)
    /// is returned as an error; everything else degrades to diagnostics.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        declared_mime: &str,
    ) -> DarkroomResult<IngestedMedia> {
        let id = RecordId::new();
        let result = self.run(id, bytes, filename, declared_mime).await;

        let diagnostics = self.context.diagnostics();
        diagnostics.release(&id.to_string());
        if let Ok(ingested) = &result
            && ingested.record.id != id
        {
            diagnostics.release(&ingested.record.id.to_string());
        }
        result
    }

    async fn run(
        &self,
        id: RecordId,
        bytes: Vec<u8>,
        filename: &str,
        declared_mime: &str,
    ) -> DarkroomResult<IngestedMedia> {
        let subject = id.to_string();

        if !self.context.capabilities().has(Capability::ExifTool)
            && looks_like_video(filename, declared_mime)
        {
            debug!(record_id = %id, "exiftool is disabled, video metadata comes from ffprobe only");
        }

        let metadata = self.context.extractor().extract(&bytes, declared_mime).await;
        if metadata.is_degraded() {
            self.context.diagnostics().record(
                DiagnosticCategory::MetadataDegraded,
                subject.as_str(),
                format!("No metadata could be read from {}", filename),
            );
        }

        let upload = Upload {
            id,
            bytes,
            filename: filename.to_string(),
            declared_mime: declared_mime.to_string(),
            metadata,
        };
        let record = self.resolver.resolve(upload).await?;

        let mut factory = SizeVariantFactory::new(self.context.clone());
        factory.init(record.clone()).await?;
        let variants = factory.create_size_variants().await?;
        Ok(IngestedMedia { record, variants })
    }
}

fn looks_like_video(filename: &str, declared_mime: &str) -> bool {
    MediaType::from_mime(declared_mime)
        .or_else(|| extension_of(filename).and_then(|ext| MediaType::from_extension(&ext)))
        == Some(MediaType::Video)
}
