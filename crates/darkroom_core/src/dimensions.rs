//! Pixel dimensions and EXIF orientation.

use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}x{}", width, height)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either axis is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Swap the axes.
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Length of the shorter side.
    pub fn shorter_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// EXIF orientation (tag 0x0112), values 1 through 8.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Orientation {
    /// 1: stored upright
    #[default]
    Normal,
    /// 2: mirrored horizontally
    FlipHorizontal,
    /// 3: rotated 180°
    Rotate180,
    /// 4: mirrored vertically
    FlipVertical,
    /// 5: mirrored along the top-left diagonal
    Transpose,
    /// 6: needs 90° clockwise rotation to display upright
    Rotate90,
    /// 7: mirrored along the top-right diagonal
    Transverse,
    /// 8: needs 270° clockwise rotation to display upright
    Rotate270,
}

impl Orientation {
    /// Parse the EXIF numeric value.
    pub fn from_exif(value: u32) -> Option<Self> {
        let orientation = match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => return None,
        };
        Some(orientation)
    }

    /// Map a video rotation in degrees (ffprobe / QuickTime) to an orientation.
    pub fn from_rotation_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Orientation::Rotate90,
            180 => Orientation::Rotate180,
            270 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    /// The EXIF numeric value.
    pub fn as_exif(&self) -> u8 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// Whether displaying upright swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Stored dimensions as they appear once displayed upright.
    pub fn apply(&self, stored: Dimensions) -> Dimensions {
        if self.swaps_axes() {
            stored.transposed()
        } else {
            stored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_exif_round_trip_values() {
        for orientation in Orientation::iter() {
            assert_eq!(
                Orientation::from_exif(orientation.as_exif() as u32),
                Some(orientation)
            );
        }
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
    }

    #[test]
    fn test_apply_swaps_for_quarter_turns() {
        let stored = Dimensions::new(1512, 2016);
        assert_eq!(Orientation::Rotate90.apply(stored), Dimensions::new(2016, 1512));
        assert_eq!(Orientation::Rotate180.apply(stored), stored);
        assert_eq!(Orientation::from_rotation_degrees(-90), Orientation::Rotate270);
    }
}
