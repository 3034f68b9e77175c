//! Size variant kinds and rows.

use crate::RecordId;
use serde::{Deserialize, Serialize};

/// Derived rendition kinds, ordered from smallest to largest.
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
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SizeVariantKind {
    /// Square thumbnail
    #[display("thumb")]
    Thumb,
    /// Square thumbnail at double density
    #[display("thumb2x")]
    Thumb2x,
    /// Small rendition
    #[display("small")]
    Small,
    /// Small rendition at double density
    #[display("small2x")]
    Small2x,
    /// Medium rendition
    #[display("medium")]
    Medium,
    /// Medium rendition at double density
    #[display("medium2x")]
    Medium2x,
    /// The stored original
    #[display("original")]
    Original,
}

impl SizeVariantKind {
    /// Ordinal (0 = thumb, 6 = original), as persisted.
    pub fn ordinal(&self) -> i16 {
        match self {
            SizeVariantKind::Thumb => 0,
            SizeVariantKind::Thumb2x => 1,
            SizeVariantKind::Small => 2,
            SizeVariantKind::Small2x => 3,
            SizeVariantKind::Medium => 4,
            SizeVariantKind::Medium2x => 5,
            SizeVariantKind::Original => 6,
        }
    }

    /// Inverse of [`SizeVariantKind::ordinal`].
    pub fn from_ordinal(ordinal: i16) -> Option<Self> {
        let kind = match ordinal {
            0 => SizeVariantKind::Thumb,
            1 => SizeVariantKind::Thumb2x,
            2 => SizeVariantKind::Small,
            3 => SizeVariantKind::Small2x,
            4 => SizeVariantKind::Medium,
            5 => SizeVariantKind::Medium2x,
            6 => SizeVariantKind::Original,
            _ => return None,
        };
        Some(kind)
    }

    /// Short name used on the command line and as storage directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeVariantKind::Thumb => "thumb",
            SizeVariantKind::Thumb2x => "thumb2x",
            SizeVariantKind::Small => "small",
            SizeVariantKind::Small2x => "small2x",
            SizeVariantKind::Medium => "medium",
            SizeVariantKind::Medium2x => "medium2x",
            SizeVariantKind::Original => "original",
        }
    }

    /// Whether this is one of the square thumbnails.
    pub fn is_thumb(&self) -> bool {
        matches!(self, SizeVariantKind::Thumb | SizeVariantKind::Thumb2x)
    }

    /// Whether this is a double-density rendition.
    pub fn is_hidpi(&self) -> bool {
        matches!(
            self,
            SizeVariantKind::Thumb2x | SizeVariantKind::Small2x | SizeVariantKind::Medium2x
        )
    }
}

impl std::str::FromStr for SizeVariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" => Ok(SizeVariantKind::Thumb),
            "thumb2x" => Ok(SizeVariantKind::Thumb2x),
            "small" => Ok(SizeVariantKind::Small),
            "small2x" => Ok(SizeVariantKind::Small2x),
            "medium" => Ok(SizeVariantKind::Medium),
            "medium2x" => Ok(SizeVariantKind::Medium2x),
            "original" => Ok(SizeVariantKind::Original),
            _ => Err(format!("Unknown size variant: {}", s)),
        }
    }
}

/// A derived rendering of a media record.
///
/// At most one exists per (record, kind). Rows are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeVariant {
    /// Owning record
    pub record_id: RecordId,
    /// Variant kind
    pub kind: SizeVariantKind,
    /// Storage key, authoritative once persisted
    pub storage_path: String,
    /// Produced width (0 when unknown for an original)
    pub width: u32,
    /// Produced height (0 when unknown for an original)
    pub height: u32,
    /// Byte length of the materialized file
    pub file_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let kinds: Vec<_> = SizeVariantKind::iter().collect();
        for pair in kinds.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
        for kind in kinds {
            assert_eq!(SizeVariantKind::from_ordinal(kind.ordinal()), Some(kind));
            assert_eq!(kind.as_str().parse::<SizeVariantKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
