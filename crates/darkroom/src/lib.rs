//! Darkroom - size variants and live photos for photo galleries
//!
//! Darkroom takes uploaded photos and videos, extracts their metadata,
//! merges the two halves of live photos into one record and derives a fixed
//! set of size variants (thumbnails and scaled renditions) for each record.
//! Missing external tools degrade the result instead of failing the upload.
//!
//! # Architecture
//!
//! Darkroom is organized as a workspace with focused crates:
//!
//! - `darkroom-error` - Error types
//! - `darkroom-core` - Records, variants, metadata, capabilities, configuration
//! - `darkroom-interface` - Collaborator traits (extractor, renderer, video tool, repository)
//! - `darkroom-storage` - File storage and variant naming
//! - `darkroom-media` - `image`, EXIF, exiftool and ffmpeg backed collaborators
//! - `darkroom-pipeline` - Variant factory, pairing resolver, ingestor, backfill
//! - `darkroom-database` - PostgreSQL repository (feature `database`)
//!
//! This crate (`darkroom`) re-exports everything for convenience.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use darkroom::{DarkroomConfig, DiagnosticLog, InMemoryMediaRepository, Ingestor, pipeline_context};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DarkroomConfig::load()?;
//!     let repository = Arc::new(InMemoryMediaRepository::new());
//!     let context = pipeline_context(&config, repository, DiagnosticLog::new())?;
//!
//!     let bytes = std::fs::read("IMG_0001.jpg")?;
//!     let ingested = Ingestor::new(context)
//!         .ingest(bytes, "IMG_0001.jpg", "image/jpeg")
//!         .await?;
//!     for variant in &ingested.variants {
//!         println!("{} {}x{}", variant.kind, variant.width, variant.height);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use darkroom_core::*;
pub use darkroom_error::*;
pub use darkroom_interface::*;
pub use darkroom_media::*;
pub use darkroom_pipeline::*;
pub use darkroom_storage::*;

#[cfg(feature = "database")]
pub use darkroom_database::{
    DbPool, PostgresMediaRepository, database_url, establish_connection, establish_pool,
    run_migrations,
};

use std::sync::Arc;

/// Wire the production collaborators around `repository`.
///
/// Files go under `config.storage.root`; the extractor, renderer and video
/// tool follow `config.capabilities` and `config.variants`.
pub fn pipeline_context(
    config: &DarkroomConfig,
    repository: Arc<dyn MediaRepository>,
    diagnostics: DiagnosticLog,
) -> DarkroomResult<PipelineContext> {
    let storage = FileSystemStorage::new(&config.storage.root)?;
    PipelineContext::builder()
        .repository(repository)
        .storage(Arc::new(storage))
        .renderer(Arc::new(ImageRenderer::new()))
        .video_tool(Arc::new(FfmpegVideoTool::new()))
        .extractor(Arc::new(NativeMetadataExtractor::new(config.capabilities)))
        .capabilities(config.capabilities)
        .settings(config.variants.clone())
        .diagnostics(diagnostics)
        .build()
        .map_err(|e| PipelineError::new(PipelineErrorKind::Builder(e.to_string())).into())
}
