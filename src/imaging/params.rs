//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to create) and the [`backend`](super::backend)
//! (which does the actual pixel work).

use crate::geometry::Dimensions;
use crate::orientation::ExifOrientation;
use std::path::PathBuf;

/// Default thumbnail box.
pub const DEFAULT_THUMBNAIL_SIZE: Dimensions = Dimensions::new(320, 240);

/// Parameters for a thumbnail operation (orient, resize to cover, center crop).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Exact output size.
    pub size: Dimensions,
    /// Orientation to undo before sizing; `None` leaves pixels as stored.
    pub orientation: Option<ExifOrientation>,
}

/// Caller-facing thumbnail options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailConfig {
    pub size: Dimensions,
    /// Apply the EXIF orientation before cropping.
    pub auto_rotate: bool,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_THUMBNAIL_SIZE,
            auto_rotate: false,
        }
    }
}
