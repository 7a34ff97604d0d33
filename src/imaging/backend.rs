//! Image processing backend trait and shared error types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: read_orientation and thumbnail.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate for pixels and `kamadak-exif` for the orientation tag.

use super::params::ThumbnailParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Input file not found: '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot identify image file '{}': {reason}", path.display())]
    Unidentified { path: PathBuf, reason: String },
    #[error("Could not save '{}': {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

/// Why orientation metadata could not be resolved.
///
/// A missing EXIF block or missing `Orientation` tag is not an error; those
/// resolve to "no rotation". Only the cases below are.
#[derive(Error, Debug)]
pub enum OrientationError {
    #[error("Input file not found: '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error opening image '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading EXIF from '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("Error fetching Orientation tag value: {0}")]
    Field(String),
}

impl OrientationError {
    /// The metadata could not be read at all (as opposed to a bad field).
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Field(_))
    }
}

/// Trait for image processing backends.
///
/// Every backend implements both operations so the rest of the codebase
/// is backend-agnostic and can be tested against a mock.
pub trait ImageBackend: Sync {
    /// Read the raw EXIF `Orientation` value.
    ///
    /// `Ok(None)` means the file is readable but carries no orientation
    /// (no EXIF block, or no tag).
    fn read_orientation(&self, path: &Path) -> Result<Option<u32>, OrientationError>;

    /// Execute a thumbnail operation (optional orientation, cover + center crop).
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
