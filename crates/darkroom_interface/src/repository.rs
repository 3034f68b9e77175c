//! Persistence contract for media records and their size variants.

use async_trait::async_trait;
use darkroom_core::{MediaRecord, MediaType, RecordId, SizeVariant, SizeVariantKind};
use darkroom_error::DarkroomResult;

/// Stores media records and size variants.
///
/// Implementations must enforce uniqueness of (record id, kind) on size
/// variants and report a conflict as
/// `RepositoryErrorKind::UniqueViolation`.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Insert a new record.
    async fn insert_record(&self, record: &MediaRecord) -> DarkroomResult<()>;

    /// Replace a stored record with the same id.
    async fn update_record(&self, record: &MediaRecord) -> DarkroomResult<()>;

    /// Delete a record together with all of its size variants.
    async fn delete_record(&self, id: RecordId) -> DarkroomResult<()>;

    /// Fetch a record by id.
    async fn get_record(&self, id: RecordId) -> DarkroomResult<Option<MediaRecord>>;

    /// Unpaired records of `media_type` that carry `content_id`, oldest first.
    async fn find_live_partners(
        &self,
        content_id: &str,
        media_type: MediaType,
    ) -> DarkroomResult<Vec<MediaRecord>>;

    /// All size variants of a record, ordered by kind.
    async fn list_variants(&self, id: RecordId) -> DarkroomResult<Vec<SizeVariant>>;

    /// Fetch one size variant.
    async fn get_variant(
        &self,
        id: RecordId,
        kind: SizeVariantKind,
    ) -> DarkroomResult<Option<SizeVariant>>;

    /// Insert a size variant, failing with a unique violation when one of
    /// the same kind already exists for the record.
    async fn insert_variant(&self, variant: &SizeVariant) -> DarkroomResult<()>;

    /// Records of `media_type` without a variant of `kind`, oldest first.
    async fn records_missing_variant(
        &self,
        kind: SizeVariantKind,
        media_type: MediaType,
        limit: usize,
    ) -> DarkroomResult<Vec<MediaRecord>>;
}
