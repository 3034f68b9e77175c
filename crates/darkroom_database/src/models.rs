//! Row types and their mapping to domain types.

use crate::schema::{media_records, size_variants};
use chrono::{DateTime, FixedOffset, Utc};
use darkroom_core::{
    CameraInfo, CompanionRef, Dimensions, LiveState, MediaRecord, MediaType, Orientation,
    RecordId, SizeVariant, SizeVariantKind,
};
use darkroom_error::{RepositoryError, RepositoryErrorKind};
use diesel::prelude::*;
use uuid::Uuid;

/// Row of `media_records`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = media_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct MediaRecordRow {
    /// Record id
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// `image` or `video`
    pub media_type: String,
    /// MIME type of the original
    pub mime_type: String,
    /// Upright width
    pub width: Option<i32>,
    /// Upright height
    pub height: Option<i32>,
    /// EXIF orientation value
    pub orientation: i16,
    /// Size of the original
    pub file_size: i64,
    /// Storage key of the original
    pub original_path: String,
    /// Capture time
    pub captured_at: Option<DateTime<Utc>>,
    /// Capture offset (`+02:00`)
    pub captured_at_timezone: Option<String>,
    /// Camera make
    pub camera_make: Option<String>,
    /// Camera model
    pub camera_model: Option<String>,
    /// Lens
    pub lens: Option<String>,
    /// ISO
    pub iso: Option<String>,
    /// Aperture
    pub aperture: Option<String>,
    /// Exposure time
    pub shutter: Option<String>,
    /// Focal length
    pub focal: Option<String>,
    /// Live photo content identifier
    pub live_companion_id: Option<String>,
    /// Storage key of the merged companion
    pub live_companion_path: Option<String>,
    /// MIME type of the merged companion
    pub live_companion_mime: Option<String>,
    /// Size of the merged companion
    pub live_companion_size: Option<i64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

fn corrupt(message: String) -> RepositoryError {
    RepositoryError::new(RepositoryErrorKind::CorruptRow(message))
}

impl From<&MediaRecord> for MediaRecordRow {
    fn from(record: &MediaRecord) -> Self {
        let companion = record.live.companion();
        Self {
            id: *record.id.as_uuid(),
            title: record.title.clone(),
            media_type: record.media_type.as_str().to_string(),
            mime_type: record.mime_type.clone(),
            width: record.dimensions.map(|d| d.width as i32),
            height: record.dimensions.map(|d| d.height as i32),
            orientation: record.orientation.as_exif() as i16,
            file_size: record.file_size as i64,
            original_path: record.original_path.clone(),
            captured_at: record.captured_at.map(|t| t.with_timezone(&Utc)),
            captured_at_timezone: record.captured_at_timezone.clone(),
            camera_make: record.camera.make.clone(),
            camera_model: record.camera.model.clone(),
            lens: record.camera.lens.clone(),
            iso: record.camera.iso.clone(),
            aperture: record.camera.aperture.clone(),
            shutter: record.camera.shutter.clone(),
            focal: record.camera.focal.clone(),
            live_companion_id: record.live_companion_id.clone(),
            live_companion_path: companion.map(|c| c.storage_path.clone()),
            live_companion_mime: companion.map(|c| c.mime_type.clone()),
            live_companion_size: companion.map(|c| c.file_size as i64),
            created_at: record.created_at,
        }
    }
}

impl TryFrom<MediaRecordRow> for MediaRecord {
    type Error = RepositoryError;

    fn try_from(row: MediaRecordRow) -> Result<Self, Self::Error> {
        let media_type: MediaType = row.media_type.parse().map_err(corrupt)?;
        let orientation = Orientation::from_exif(row.orientation as u32)
            .ok_or_else(|| corrupt(format!("orientation {}", row.orientation)))?;

        let dimensions = match (row.width, row.height) {
            (Some(w), Some(h)) if w >= 0 && h >= 0 => Some(Dimensions::new(w as u32, h as u32)),
            (None, None) => None,
            (w, h) => return Err(corrupt(format!("dimensions {:?}x{:?}", w, h))),
        };

        let captured_at = row.captured_at.map(|utc| {
            match row
                .captured_at_timezone
                .as_deref()
                .and_then(|tz| tz.parse::<FixedOffset>().ok())
            {
                Some(offset) => utc.with_timezone(&offset),
                None => utc.fixed_offset(),
            }
        });

        let live = match row.live_companion_path {
            Some(storage_path) => LiveState::PairedAsImage {
                companion: CompanionRef {
                    storage_path,
                    mime_type: row.live_companion_mime.unwrap_or_default(),
                    file_size: row.live_companion_size.unwrap_or_default().max(0) as u64,
                },
            },
            None => LiveState::Standalone,
        };

        Ok(MediaRecord {
            id: RecordId::from(row.id),
            title: row.title,
            media_type,
            mime_type: row.mime_type,
            dimensions,
            orientation,
            file_size: row.file_size.max(0) as u64,
            original_path: row.original_path,
            captured_at,
            captured_at_timezone: row.captured_at_timezone,
            camera: CameraInfo {
                make: row.camera_make,
                model: row.camera_model,
                lens: row.lens,
                iso: row.iso,
                aperture: row.aperture,
                shutter: row.shutter,
                focal: row.focal,
            },
            live_companion_id: row.live_companion_id,
            live,
            created_at: row.created_at,
        })
    }
}

/// Row of `size_variants`. `created_at` is filled by the database.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = size_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SizeVariantRow {
    /// Owning record
    pub record_id: Uuid,
    /// Kind ordinal
    pub kind: i16,
    /// Storage key
    pub storage_path: String,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
    /// File size
    pub file_size: Option<i64>,
}

impl From<&SizeVariant> for SizeVariantRow {
    fn from(variant: &SizeVariant) -> Self {
        Self {
            record_id: *variant.record_id.as_uuid(),
            kind: variant.kind.ordinal(),
            storage_path: variant.storage_path.clone(),
            width: variant.width as i32,
            height: variant.height as i32,
            file_size: variant.file_size.map(|size| size as i64),
        }
    }
}

impl TryFrom<SizeVariantRow> for SizeVariant {
    type Error = RepositoryError;

    fn try_from(row: SizeVariantRow) -> Result<Self, Self::Error> {
        let kind = SizeVariantKind::from_ordinal(row.kind)
            .ok_or_else(|| corrupt(format!("size variant kind {}", row.kind)))?;
        Ok(SizeVariant {
            record_id: RecordId::from(row.record_id),
            kind,
            storage_path: row.storage_path,
            width: row.width.max(0) as u32,
            height: row.height.max(0) as u32,
            file_size: row.file_size.map(|size| size.max(0) as u64),
        })
    }
}
