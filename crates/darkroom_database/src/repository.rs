//! PostgreSQL implementation of [`MediaRepository`].

use crate::connection::DbPool;
use crate::models::{MediaRecordRow, SizeVariantRow};
use crate::schema::{media_records, size_variants};
use async_trait::async_trait;
use darkroom_core::{MediaRecord, MediaType, RecordId, SizeVariant, SizeVariantKind};
use darkroom_error::{
    DarkroomResult, DatabaseError, DatabaseErrorKind, RepositoryError, RepositoryErrorKind,
};
use darkroom_interface::MediaRepository;
use diesel::dsl::{exists, not};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use tracing::{debug, instrument};

/// Media repository over an r2d2 connection pool.
///
/// Diesel is synchronous, so every call runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct PostgresMediaRepository {
    pool: DbPool,
}

impl PostgresMediaRepository {
    /// Create a repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> DarkroomResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PooledConnection<ConnectionManager<PgConnection>>) -> DarkroomResult<T>
            + Send
            + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection(format!(
                    "Failed to get connection from pool: {}",
                    e
                )))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::new(RepositoryErrorKind::Backend(format!(
                "Task join error: {}",
                e
            )))
        })?
    }
}

fn load_records(rows: Vec<MediaRecordRow>) -> DarkroomResult<Vec<MediaRecord>> {
    rows.into_iter()
        .map(|row| MediaRecord::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn insert_record(&self, record: &MediaRecord) -> DarkroomResult<()> {
        let row = MediaRecordRow::from(record);
        self.with_conn(move |conn| {
            diesel::insert_into(media_records::table)
                .values(&row)
                .execute(conn)
                .map_err(DatabaseError::from)?;
            debug!("Inserted media record");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn update_record(&self, record: &MediaRecord) -> DarkroomResult<()> {
        let row = MediaRecordRow::from(record);
        let id = record.id;
        self.with_conn(move |conn| {
            let updated = diesel::update(media_records::table.find(row.id))
                .set(&row)
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if updated == 0 {
                return Err(RepositoryError::new(RepositoryErrorKind::RecordNotFound(
                    id.to_string(),
                ))
                .into());
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: RecordId) -> DarkroomResult<()> {
        let uuid = *id.as_uuid();
        self.with_conn(move |conn| {
            // size_variants rows cascade
            let deleted = diesel::delete(media_records::table.find(uuid))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if deleted == 0 {
                return Err(
                    RepositoryError::new(RepositoryErrorKind::RecordNotFound(id.to_string()))
                        .into(),
                );
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_record(&self, id: RecordId) -> DarkroomResult<Option<MediaRecord>> {
        let uuid = *id.as_uuid();
        self.with_conn(move |conn| {
            let row = media_records::table
                .find(uuid)
                .select(MediaRecordRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            row.map(|row| MediaRecord::try_from(row).map_err(Into::into))
                .transpose()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_live_partners(
        &self,
        content_id: &str,
        media_type: MediaType,
    ) -> DarkroomResult<Vec<MediaRecord>> {
        let content_id = content_id.to_string();
        self.with_conn(move |conn| {
            let rows = media_records::table
                .filter(media_records::live_companion_id.eq(content_id))
                .filter(media_records::media_type.eq(media_type.as_str()))
                .filter(media_records::live_companion_path.is_null())
                .order((media_records::created_at.asc(), media_records::id.asc()))
                .select(MediaRecordRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            load_records(rows)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_variants(&self, id: RecordId) -> DarkroomResult<Vec<SizeVariant>> {
        let uuid = *id.as_uuid();
        self.with_conn(move |conn| {
            let rows = size_variants::table
                .filter(size_variants::record_id.eq(uuid))
                .order(size_variants::kind.asc())
                .select(SizeVariantRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            rows.into_iter()
                .map(|row| SizeVariant::try_from(row).map_err(Into::into))
                .collect()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_variant(
        &self,
        id: RecordId,
        kind: SizeVariantKind,
    ) -> DarkroomResult<Option<SizeVariant>> {
        let uuid = *id.as_uuid();
        self.with_conn(move |conn| {
            let row = size_variants::table
                .find((uuid, kind.ordinal()))
                .select(SizeVariantRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            row.map(|row| SizeVariant::try_from(row).map_err(Into::into))
                .transpose()
        })
        .await
    }

    #[instrument(skip(self, variant), fields(record_id = %variant.record_id, kind = %variant.kind))]
    async fn insert_variant(&self, variant: &SizeVariant) -> DarkroomResult<()> {
        let row = SizeVariantRow::from(variant);
        let (record_id, kind) = (variant.record_id, variant.kind);
        self.with_conn(move |conn| {
            match diesel::insert_into(size_variants::table)
                .values(&row)
                .execute(conn)
                .map_err(DatabaseError::from)
            {
                Ok(_) => Ok(()),
                Err(e) if matches!(e.kind, DatabaseErrorKind::UniqueViolation(_)) => {
                    Err(RepositoryError::new(RepositoryErrorKind::UniqueViolation {
                        record_id: record_id.to_string(),
                        kind: kind.to_string(),
                    })
                    .into())
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn records_missing_variant(
        &self,
        kind: SizeVariantKind,
        media_type: MediaType,
        limit: usize,
    ) -> DarkroomResult<Vec<MediaRecord>> {
        self.with_conn(move |conn| {
            let rows = media_records::table
                .filter(media_records::media_type.eq(media_type.as_str()))
                .filter(not(exists(
                    size_variants::table
                        .filter(size_variants::record_id.eq(media_records::id))
                        .filter(size_variants::kind.eq(kind.ordinal())),
                )))
                .order((media_records::created_at.asc(), media_records::id.asc()))
                .limit(i64::try_from(limit).unwrap_or(i64::MAX))
                .select(MediaRecordRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            load_records(rows)
        })
        .await
    }
}
