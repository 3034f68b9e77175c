//! Collaborators shared by every pipeline stage.

use darkroom_core::{Capabilities, DiagnosticLog, VariantSettings};
use darkroom_interface::{MediaRepository, MetadataExtractor, Renderer, VideoTool};
use darkroom_storage::{GroupedRandomSuffixNamingStrategy, MediaStorage, SizeVariantNamingStrategy};
use derive_getters::Getters;
use std::sync::Arc;

fn default_naming() -> Arc<dyn SizeVariantNamingStrategy> {
    Arc::new(GroupedRandomSuffixNamingStrategy)
}

/// Everything the factory, resolver and scheduler talk to.
///
/// Capability flags are passed in here rather than read from ambient state,
/// so every capability-dependent branch can be driven from a test.
///
/// # Example
///
/// ```no_run
/// use darkroom_pipeline::PipelineContextBuilder;
/// # fn parts() -> (
/// #     std::sync::Arc<dyn darkroom_interface::MediaRepository>,
/// #     std::sync::Arc<dyn darkroom_storage::MediaStorage>,
/// #     std::sync::Arc<dyn darkroom_interface::Renderer>,
/// #     std::sync::Arc<dyn darkroom_interface::VideoTool>,
/// #     std::sync::Arc<dyn darkroom_interface::MetadataExtractor>,
/// # ) { unimplemented!() }
///
/// let (repository, storage, renderer, video_tool, extractor) = parts();
/// let context = PipelineContextBuilder::default()
///     .repository(repository)
///     .storage(storage)
///     .renderer(renderer)
///     .video_tool(video_tool)
///     .extractor(extractor)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Getters, derive_setters::Setters, derive_builder::Builder)]
#[setters(prefix = "with_")]
pub struct PipelineContext {
    /// Record and variant persistence
    repository: Arc<dyn MediaRepository>,
    /// Blob storage for originals, companions and variants
    storage: Arc<dyn MediaStorage>,
    /// Still image renderer
    renderer: Arc<dyn Renderer>,
    /// Video probing and frame extraction
    video_tool: Arc<dyn VideoTool>,
    /// Metadata extraction
    extractor: Arc<dyn MetadataExtractor>,
    /// Storage names for originals and variants
    #[builder(default = "default_naming()")]
    naming: Arc<dyn SizeVariantNamingStrategy>,
    /// Which optional tools may be used
    #[builder(default)]
    capabilities: Capabilities,
    /// Variant boxes and encoder settings
    #[builder(default)]
    settings: VariantSettings,
    /// Where recoverable failures are written
    #[builder(default)]
    diagnostics: DiagnosticLog,
}

impl PipelineContext {
    /// Start building a context.
    pub fn builder() -> PipelineContextBuilder {
        PipelineContextBuilder::default()
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("capabilities", &self.capabilities)
            .field("settings", &self.settings)
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}
