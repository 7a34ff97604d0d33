//! EXIF orientation codes and the display rotation they imply.
//!
//! Cameras store pixels in sensor order and record how the picture should be
//! turned for display in the EXIF `Orientation` tag (`0x0112`). The tag holds
//! one of eight codes:
//!
//! | Code | Meaning | Rotation |
//! |------|---------|----------|
//! | 1 | normal | 0 |
//! | 2 | flip horizontal | 0 |
//! | 3 | rotate 180 | 180 |
//! | 4 | flip vertical | 180 |
//! | 5 | transpose | 270 |
//! | 6 | rotate 90 | 90 |
//! | 7 | transverse | 90 |
//! | 8 | rotate 270 | 270 |
//!
//! Any other value, and a missing tag, resolve to 0 degrees. Unknown codes are
//! never an error: plenty of writers emit `0` or garbage here.

use std::fmt;

/// One of the eight EXIF orientation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifOrientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl ExifOrientation {
    /// All eight states in code order.
    pub const ALL: [ExifOrientation; 8] = [
        Self::Normal,
        Self::FlipHorizontal,
        Self::Rotate180,
        Self::FlipVertical,
        Self::Transpose,
        Self::Rotate90,
        Self::Transverse,
        Self::Rotate270,
    ];

    /// Parse a raw tag value. Returns `None` for anything outside 1–8.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Transpose => 5,
            Self::Rotate90 => 6,
            Self::Transverse => 7,
            Self::Rotate270 => 8,
        }
    }

    /// Clockwise rotation needed to display the image upright.
    pub fn rotation(self) -> RotationDegrees {
        match self {
            Self::Normal | Self::FlipHorizontal => RotationDegrees::Zero,
            Self::Rotate180 | Self::FlipVertical => RotationDegrees::Half,
            Self::Transpose | Self::Rotate270 => RotationDegrees::ThreeQuarter,
            Self::Rotate90 | Self::Transverse => RotationDegrees::Quarter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::FlipHorizontal => "flip_horizontal",
            Self::Rotate180 => "rotate_180",
            Self::FlipVertical => "flip_vertical",
            Self::Transpose => "transpose",
            Self::Rotate90 => "rotate_90",
            Self::Transverse => "transverse",
            Self::Rotate270 => "rotate_270",
        }
    }
}

impl fmt::Display for ExifOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// A display-correction rotation in clockwise degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationDegrees {
    #[default]
    Zero,
    Quarter,
    Half,
    ThreeQuarter,
}

impl RotationDegrees {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Zero => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }
}

impl fmt::Display for RotationDegrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Resolve a raw orientation tag value (or its absence) to a rotation.
///
/// Total: absent and unrecognized values resolve to [`RotationDegrees::Zero`].
pub fn rotation_for_code(code: Option<i64>) -> RotationDegrees {
    code.and_then(ExifOrientation::from_code)
        .map(ExifOrientation::rotation)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_exif_codes() {
        let expected = [0, 0, 180, 180, 270, 90, 90, 270];
        for (code, degrees) in (1..=8).zip(expected) {
            assert_eq!(
                rotation_for_code(Some(code)).degrees(),
                degrees,
                "orientation code {code}"
            );
        }
    }

    #[test]
    fn out_of_range_codes_resolve_to_zero() {
        for code in [-1, 0, 9, 42, i64::MIN, i64::MAX] {
            assert_eq!(rotation_for_code(Some(code)), RotationDegrees::Zero);
        }
    }

    #[test]
    fn absent_code_resolves_to_zero() {
        assert_eq!(rotation_for_code(None), RotationDegrees::Zero);
    }

    #[test]
    fn codes_roundtrip_through_enum() {
        for o in ExifOrientation::ALL {
            assert_eq!(ExifOrientation::from_code(o.code() as i64), Some(o));
        }
    }

    #[test]
    fn display_includes_label() {
        assert_eq!(ExifOrientation::Rotate90.to_string(), "6 (rotate_90)");
        assert_eq!(RotationDegrees::ThreeQuarter.to_string(), "270");
    }
}
