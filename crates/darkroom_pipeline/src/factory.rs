//! Conditional creation of size variants for one record.
//!
//! A factory is bound to a single record with [`SizeVariantFactory::init`].
//! The record's existing variants are read once at that point; every later
//! decision is made against that snapshot plus whatever this factory created.
//! Concurrent factories working on the same record are reconciled by the
//! repository's uniqueness check on (record id, kind).

use crate::{PipelineContext, VariantSpecTable};
use darkroom_core::{
    Capability, DiagnosticCategory, MediaRecord, MediaType, Orientation, SizeVariant,
    SizeVariantKind,
};
use darkroom_error::{
    DarkroomResult, PipelineError, PipelineErrorKind, RepositoryError, RepositoryErrorKind,
};
use darkroom_interface::RenderRequest;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const FRAME_UNAVAILABLE: &str = "cannot extract a frame for size variants";

#[derive(Debug, Clone)]
enum Source {
    NotLoaded,
    Loaded(Arc<[u8]>),
    Unavailable,
}

#[derive(Debug)]
struct Binding {
    record: MediaRecord,
    variants: BTreeMap<SizeVariantKind, SizeVariant>,
    source: Source,
}

/// Decides, renders and persists the size variants of one record.
#[derive(Debug)]
pub struct SizeVariantFactory {
    context: PipelineContext,
    table: VariantSpecTable,
    binding: Option<Binding>,
}

impl SizeVariantFactory {
    /// Create an unbound factory.
    pub fn new(context: PipelineContext) -> Self {
        let table = VariantSpecTable::new(context.settings());
        Self {
            context,
            table,
            binding: None,
        }
    }

    /// Bind to `record` and load its existing variants.
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn init(&mut self, record: MediaRecord) -> DarkroomResult<()> {
        let variants = self
            .context
            .repository()
            .list_variants(record.id)
            .await?
            .into_iter()
            .map(|variant| (variant.kind, variant))
            .collect::<BTreeMap<_, _>>();
        debug!(existing = variants.len(), "Factory bound");
        self.binding = Some(Binding {
            record,
            variants,
            source: Source::NotLoaded,
        });
        Ok(())
    }

    /// The bound record.
    pub fn record(&self) -> Option<&MediaRecord> {
        self.binding.as_ref().map(|binding| &binding.record)
    }

    /// Every variant known for the bound record, smallest first.
    pub fn variants(&self) -> DarkroomResult<Vec<SizeVariant>> {
        Ok(self.binding()?.variants.values().cloned().collect())
    }

    fn binding(&self) -> DarkroomResult<&Binding> {
        self.binding
            .as_ref()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NotInitialized).into())
    }

    fn binding_mut(&mut self) -> DarkroomResult<&mut Binding> {
        self.binding
            .as_mut()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NotInitialized).into())
    }

    /// Create the `kind` variant unless it exists or cannot be produced.
    ///
    /// Returns the existing or new variant, or `None` when the variant was
    /// declined. Render, frame and storage failures of the variant itself are
    /// written to the diagnostic log and decline; only repository and
    /// original-file failures return `Err`.
    #[instrument(skip(self), fields(record_id = tracing::field::Empty))]
    pub async fn create_size_variant_cond(
        &mut self,
        kind: SizeVariantKind,
    ) -> DarkroomResult<Option<SizeVariant>> {
        let binding = self.binding()?;
        tracing::Span::current().record("record_id", tracing::field::display(binding.record.id));

        if let Some(existing) = binding.variants.get(&kind) {
            debug!("Variant already exists");
            return Ok(Some(existing.clone()));
        }

        let record = binding.record.clone();
        if kind == SizeVariantKind::Original {
            return self.record_original(&record).await.map(Some);
        }

        let Some(candidate) = self.table.candidate(record.media_type, kind).copied() else {
            debug!(media_type = %record.media_type, "No candidate for this media type");
            return Ok(None);
        };

        let ffmpeg = self.context.capabilities().has(Capability::FFmpeg);
        if record.media_type == MediaType::Video && !ffmpeg {
            self.context.diagnostics().capability_disabled(
                record.id.to_string(),
                Capability::FFmpeg,
                FRAME_UNAVAILABLE,
            );
            return Ok(None);
        }

        let Some(source_dimensions) = record.known_dimensions() else {
            debug!("Source dimensions unknown");
            return Ok(None);
        };

        let Some(target) = self
            .table
            .target_box(record.media_type, &candidate, source_dimensions)
        else {
            debug!(source = %source_dimensions, "Candidate declined for this source");
            return Ok(None);
        };

        let Some(source) = self.source(&record).await? else {
            return Ok(None);
        };

        // Extracted frames come out of ffmpeg already rotated.
        let orientation = match record.media_type {
            MediaType::Image => record.orientation,
            MediaType::Video => Orientation::Normal,
        };
        let request = RenderRequest {
            width: target.width,
            height: target.height,
            crop: candidate.crop,
            orientation,
            quality: self.context.settings().jpeg_quality,
        };

        let rendered = match self.context.renderer().render(&source, &request).await {
            Ok(rendered) => rendered,
            Err(e) => {
                self.context
                    .diagnostics()
                    .render_failed(record.id.to_string(), kind, e);
                return Ok(None);
            }
        };

        let storage_path =
            self.context
                .naming()
                .name(record.id, kind, candidate.format.extension());

        let file_size = match self
            .context
            .storage()
            .put(&storage_path, &rendered.bytes)
            .await
        {
            Ok(size) => size,
            Err(e) => {
                self.context.diagnostics().record(
                    DiagnosticCategory::StorageFailed,
                    record.id.to_string(),
                    format!("Could not store {} for {}: {}", kind, record.id, e),
                );
                return Ok(None);
            }
        };

        let variant = SizeVariant {
            record_id: record.id,
            kind,
            storage_path,
            width: rendered.width,
            height: rendered.height,
            file_size: Some(file_size),
        };
        let variant = self.persist(variant).await?;
        info!(
            kind = %variant.kind,
            width = variant.width,
            height = variant.height,
            "Created size variant"
        );
        Ok(Some(variant))
    }

    /// Run every candidate for the bound record and return the full set.
    ///
    /// `Original` comes first, then candidates from largest to smallest.
    #[instrument(skip(self))]
    pub async fn create_size_variants(&mut self) -> DarkroomResult<Vec<SizeVariant>> {
        let media_type = self.binding()?.record.media_type;
        let kinds: Vec<SizeVariantKind> = std::iter::once(SizeVariantKind::Original)
            .chain(
                self.table
                    .candidates(media_type)
                    .iter()
                    .rev()
                    .map(|candidate| candidate.kind),
            )
            .collect();

        for kind in kinds {
            self.create_size_variant_cond(kind).await?;
        }
        self.variants()
    }

    async fn record_original(&mut self, record: &MediaRecord) -> DarkroomResult<SizeVariant> {
        // Unknown dimensions are recorded as 0x0 rather than guessed. A video
        // only counts as measured when ffprobe could look at it.
        let ffmpeg = self.context.capabilities().has(Capability::FFmpeg);
        let measured = match record.media_type {
            MediaType::Image => record.known_dimensions(),
            MediaType::Video if ffmpeg => record.known_dimensions(),
            MediaType::Video => {
                self.context.diagnostics().capability_disabled(
                    record.id.to_string(),
                    Capability::FFmpeg,
                    FRAME_UNAVAILABLE,
                );
                None
            }
        };
        let (width, height) = measured.map(|d| (d.width, d.height)).unwrap_or((0, 0));
        let variant = SizeVariant {
            record_id: record.id,
            kind: SizeVariantKind::Original,
            storage_path: record.original_path.clone(),
            width,
            height,
            file_size: Some(record.file_size),
        };
        self.persist(variant).await
    }

    async fn persist(&mut self, variant: SizeVariant) -> DarkroomResult<SizeVariant> {
        let repository = self.context.repository().clone();
        let stored = match repository.insert_variant(&variant).await {
            Ok(()) => variant,
            Err(e) if e.is_unique_violation() => {
                debug!(kind = %variant.kind, "Lost creation race, using existing row");
                if variant.kind != SizeVariantKind::Original {
                    self.discard(&variant).await;
                }
                repository
                    .get_variant(variant.record_id, variant.kind)
                    .await?
                    .ok_or_else(|| {
                        RepositoryError::new(RepositoryErrorKind::RecordNotFound(format!(
                            "{} variant of {}",
                            variant.kind, variant.record_id
                        )))
                    })?
            }
            Err(e) => {
                if variant.kind != SizeVariantKind::Original {
                    self.discard(&variant).await;
                }
                return Err(e);
            }
        };
        self.binding_mut()?
            .variants
            .insert(stored.kind, stored.clone());
        Ok(stored)
    }

    async fn discard(&self, variant: &SizeVariant) {
        if let Err(e) = self.context.storage().delete(&variant.storage_path).await {
            self.context.diagnostics().record(
                DiagnosticCategory::StorageFailed,
                variant.record_id.to_string(),
                format!("Could not remove {}: {}", variant.storage_path, e),
            );
        }
    }

    /// Bytes to render from: the original image, or one frame of a video.
    async fn source(&mut self, record: &MediaRecord) -> DarkroomResult<Option<Arc<[u8]>>> {
        match &self.binding()?.source {
            Source::Loaded(bytes) => return Ok(Some(bytes.clone())),
            Source::Unavailable => return Ok(None),
            Source::NotLoaded => {}
        }

        let original = self.context.storage().get(&record.original_path).await?;
        let source = match record.media_type {
            MediaType::Image => Source::Loaded(original.into()),
            MediaType::Video => match self.context.video_tool().extract_frame(&original).await {
                Ok(frame) => Source::Loaded(frame.into()),
                Err(e) => {
                    self.context
                        .diagnostics()
                        .render_failed(record.id.to_string(), "still frame", e);
                    Source::Unavailable
                }
            },
        };

        let binding = self.binding_mut()?;
        binding.source = source;
        Ok(match &binding.source {
            Source::Loaded(bytes) => Some(bytes.clone()),
            _ => None,
        })
    }
}
