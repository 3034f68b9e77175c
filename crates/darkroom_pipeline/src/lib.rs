//! Size variant derivation and live photo pairing.
//!
//! The pipeline runs in three steps for every upload: metadata extraction,
//! pairing ([`PairingResolver`]) and variant creation
//! ([`SizeVariantFactory`]). [`Ingestor`] strings them together and
//! [`BackfillScheduler`] re-drives only the last step for stored images.
//!
//! All collaborators come in through [`PipelineContext`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backfill;
mod context;
mod factory;
mod in_memory_repository;
mod ingestor;
mod resolver;
mod variant_table;

pub use backfill::{BackfillOutcome, BackfillReport, BackfillScheduler};
pub use context::{PipelineContext, PipelineContextBuilder, PipelineContextBuilderError};
pub use factory::SizeVariantFactory;
pub use in_memory_repository::InMemoryMediaRepository;
pub use ingestor::{IngestedMedia, Ingestor};
pub use resolver::{PairingResolver, Upload, UploadBuilder, UploadBuilderError};
pub use variant_table::{VariantCandidate, VariantFormat, VariantSpecTable};
