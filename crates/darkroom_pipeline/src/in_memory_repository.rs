//! In-memory implementation of MediaRepository for testing.
//!
//! Records and variants live in HashMaps behind tokio RwLocks. The
//! (record id, kind) uniqueness check happens under the write lock, so it is
//! as strict as the database constraint.

use async_trait::async_trait;
use darkroom_core::{MediaRecord, MediaType, RecordId, SizeVariant, SizeVariantKind};
use darkroom_error::{DarkroomResult, RepositoryError, RepositoryErrorKind};
use darkroom_interface::MediaRepository;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type VariantMap = HashMap<RecordId, BTreeMap<SizeVariantKind, SizeVariant>>;

/// In-memory repository for media records and their size variants.
///
/// All data is lost when the repository is dropped.
///
/// # Example
/// ```no_run
/// use darkroom_pipeline::InMemoryMediaRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemoryMediaRepository::new();
///     assert!(repo.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaRepository {
    records: Arc<RwLock<HashMap<RecordId, MediaRecord>>>,
    variants: Arc<RwLock<VariantMap>>,
}

impl InMemoryMediaRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All records, oldest first.
    pub async fn records(&self) -> Vec<MediaRecord> {
        let mut records: Vec<MediaRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|record| (record.created_at, record.id));
        records
    }

    /// Total number of variant rows across all records.
    pub async fn variant_count(&self) -> usize {
        self.variants.read().await.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn insert_record(&self, record: &MediaRecord) -> DarkroomResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(RepositoryError::new(RepositoryErrorKind::Backend(format!(
                "Media record {} already exists",
                record.id
            )))
            .into());
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_record(&self, record: &MediaRecord) -> DarkroomResult<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::new(RepositoryErrorKind::RecordNotFound(
                record.id.to_string(),
            ))
            .into()),
        }
    }

    async fn delete_record(&self, id: RecordId) -> DarkroomResult<()> {
        if self.records.write().await.remove(&id).is_none() {
            return Err(
                RepositoryError::new(RepositoryErrorKind::RecordNotFound(id.to_string())).into(),
            );
        }
        self.variants.write().await.remove(&id);
        Ok(())
    }

    async fn get_record(&self, id: RecordId) -> DarkroomResult<Option<MediaRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_live_partners(
        &self,
        content_id: &str,
        media_type: MediaType,
    ) -> DarkroomResult<Vec<MediaRecord>> {
        let records = self.records.read().await;
        let mut partners: Vec<MediaRecord> = records
            .values()
            .filter(|record| {
                record.media_type == media_type
                    && record.is_unpaired()
                    && record.live_companion_id.as_deref() == Some(content_id)
            })
            .cloned()
            .collect();
        partners.sort_by_key(|record| (record.created_at, record.id));
        Ok(partners)
    }

    async fn list_variants(&self, id: RecordId) -> DarkroomResult<Vec<SizeVariant>> {
        Ok(self
            .variants
            .read()
            .await
            .get(&id)
            .map(|variants| variants.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_variant(
        &self,
        id: RecordId,
        kind: SizeVariantKind,
    ) -> DarkroomResult<Option<SizeVariant>> {
        Ok(self
            .variants
            .read()
            .await
            .get(&id)
            .and_then(|variants| variants.get(&kind))
            .cloned())
    }

    async fn insert_variant(&self, variant: &SizeVariant) -> DarkroomResult<()> {
        if !self.records.read().await.contains_key(&variant.record_id) {
            return Err(RepositoryError::new(RepositoryErrorKind::RecordNotFound(
                variant.record_id.to_string(),
            ))
            .into());
        }

        let mut variants = self.variants.write().await;
        let per_record = variants.entry(variant.record_id).or_default();
        if per_record.contains_key(&variant.kind) {
            return Err(RepositoryError::new(RepositoryErrorKind::UniqueViolation {
                record_id: variant.record_id.to_string(),
                kind: variant.kind.to_string(),
            })
            .into());
        }
        per_record.insert(variant.kind, variant.clone());
        Ok(())
    }

    async fn records_missing_variant(
        &self,
        kind: SizeVariantKind,
        media_type: MediaType,
        limit: usize,
    ) -> DarkroomResult<Vec<MediaRecord>> {
        let records = self.records.read().await;
        let variants = self.variants.read().await;
        let mut missing: Vec<MediaRecord> = records
            .values()
            .filter(|record| record.media_type == media_type)
            .filter(|record| {
                variants
                    .get(&record.id)
                    .is_none_or(|existing| !existing.contains_key(&kind))
            })
            .cloned()
            .collect();
        missing.sort_by_key(|record| (record.created_at, record.id));
        missing.truncate(limit);
        Ok(missing)
    }
}
