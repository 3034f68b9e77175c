//! Core data types for the Darkroom media derivation pipeline.
//!
//! This crate provides the entities the pipeline operates on (media records and
//! their size variants), the best-effort metadata result type, the injected
//! capability flags, the diagnostics log and configuration loading.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capabilities;
mod config;
mod diagnostics;
mod dimensions;
mod media_type;
mod metadata;
mod record;
mod variant;

pub use capabilities::{Capabilities, Capability};
pub use config::{
    BackfillSettings, BoxSize, DarkroomConfig, DatabaseSettings, StorageSettings, VariantSettings,
};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticLog};
pub use dimensions::{Dimensions, Orientation};
pub use media_type::{MediaType, guess_extension, guess_mime_type};
pub use metadata::{CameraInfo, Extracted, Metadata};
pub use record::{CompanionRef, LiveState, MediaRecord, RecordId};
pub use variant::{SizeVariant, SizeVariantKind};
