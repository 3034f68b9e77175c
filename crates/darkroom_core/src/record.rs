//! Media records and their live photo state.

use crate::{CameraInfo, Dimensions, MediaType, Orientation};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable identity of a media record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{}", _0)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Allocate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// A companion video merged into an image record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanionRef {
    /// Storage key of the companion file
    pub storage_path: String,
    /// MIME type of the companion
    pub mime_type: String,
    /// Size in bytes of the companion
    pub file_size: u64,
}

/// Whether a record carries a merged live photo companion.
///
/// Pairing always anchors on the image half, so only images can be paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LiveState {
    /// No companion (yet)
    #[default]
    Standalone,
    /// Still image with its motion companion attached
    PairedAsImage {
        /// The attached video
        companion: CompanionRef,
    },
}

impl LiveState {
    /// The companion reference if paired.
    pub fn companion(&self) -> Option<&CompanionRef> {
        match self {
            LiveState::Standalone => None,
            LiveState::PairedAsImage { companion } => Some(companion),
        }
    }
}

/// The logical unit the pipeline operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Identity, immutable once assigned
    pub id: RecordId,
    /// Display title (the upload's file stem)
    pub title: String,
    /// Image or video
    pub media_type: MediaType,
    /// MIME type of the original
    pub mime_type: String,
    /// Upright pixel dimensions, absent until known
    pub dimensions: Option<Dimensions>,
    /// Orientation the original is stored in
    pub orientation: Orientation,
    /// Byte length of the stored original
    pub file_size: u64,
    /// Storage key of the original
    pub original_path: String,
    /// Capture timestamp
    pub captured_at: Option<DateTime<FixedOffset>>,
    /// Offset the capture timestamp was recorded in (`+02:00`)
    pub captured_at_timezone: Option<String>,
    /// Camera fields
    pub camera: CameraInfo,
    /// Content identifier used to match the halves of a live photo
    pub live_companion_id: Option<String>,
    /// Live photo pairing state
    pub live: LiveState,
    /// Creation time, used for pairing tie-breaks
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Storage key of the merged companion, if any.
    pub fn live_companion_url(&self) -> Option<&str> {
        self.live.companion().map(|c| c.storage_path.as_str())
    }

    /// Dimensions usable for scaling math: known and non-zero.
    pub fn known_dimensions(&self) -> Option<Dimensions> {
        self.dimensions.filter(|d| !d.is_degenerate())
    }

    /// Whether this record can still receive a live photo partner.
    pub fn is_unpaired(&self) -> bool {
        matches!(self.live, LiveState::Standalone)
    }
}
