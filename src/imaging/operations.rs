//! High-level image operations.
//!
//! These functions combine the orientation table with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend, OrientationError};
use super::params::{ThumbnailConfig, ThumbnailParams};
use crate::orientation::{ExifOrientation, RotationDegrees, rotation_for_code};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Could not create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read orientation: {0}")]
    Orientation(#[from] OrientationError),
    #[error("Thumbnail creation failed: {0}")]
    Backend(#[from] BackendError),
}

/// Read the EXIF orientation and return the clockwise rotation needed for
/// upright display.
///
/// Files without EXIF, without an `Orientation` tag, or with an unknown
/// code resolve to 0. Missing, unreadable or unparseable files are errors.
pub fn get_image_orientation(
    backend: &impl ImageBackend,
    path: &Path,
) -> Result<RotationDegrees, OrientationError> {
    let raw = backend.read_orientation(path)?;
    Ok(rotation_for_code(raw.map(i64::from)))
}

/// Like [`get_image_orientation`] but returns the full orientation state
/// (flips included), or `None` when there is nothing to undo.
pub fn read_exif_orientation(
    backend: &impl ImageBackend,
    path: &Path,
) -> Result<Option<ExifOrientation>, OrientationError> {
    let raw = backend.read_orientation(path)?;
    Ok(raw
        .and_then(|code| ExifOrientation::from_code(code.into()))
        .filter(|o| *o != ExifOrientation::Normal))
}

/// Plan a thumbnail operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
    orientation: Option<ExifOrientation>,
) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        size: config.size,
        orientation: if config.auto_rotate { orientation } else { None },
    }
}

/// Create an exactly-sized thumbnail: optional auto-rotation, then resize to
/// cover the box and center-crop.
///
/// The output directory is created if missing.
pub fn create_image_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<ThumbnailParams, ThumbnailError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ThumbnailError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let orientation = if config.auto_rotate {
        read_exif_orientation(backend, source)?
    } else {
        None
    };

    let params = plan_thumbnail(source, output, config, orientation);
    log::debug!(
        "thumbnail {} -> {} ({}, orientation {:?})",
        source.display(),
        output.display(),
        params.size,
        params.orientation
    );
    backend.thumbnail(&params)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn orientation_codes_map_through_backend() {
        for (code, degrees) in [(1, 0), (3, 180), (6, 90), (8, 270), (9, 0), (0, 0)] {
            let backend = MockBackend::with_orientation(Ok(Some(code)));
            let rotation = get_image_orientation(&backend, Path::new("/a.jpg")).unwrap();
            assert_eq!(rotation.degrees(), degrees, "code {code}");
        }
    }

    #[test]
    fn absent_orientation_is_zero_not_error() {
        let backend = MockBackend::with_orientation(Ok(None));
        let rotation = get_image_orientation(&backend, Path::new("/a.jpg")).unwrap();
        assert_eq!(rotation, RotationDegrees::Zero);
    }

    #[test]
    fn unreadable_metadata_propagates() {
        let backend =
            MockBackend::with_orientation(Err(OrientationError::NotFound("/missing.jpg".into())));
        let err = get_image_orientation(&backend, Path::new("/missing.jpg")).unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn field_error_propagates() {
        let backend = MockBackend::with_orientation(Err(OrientationError::Field("boom".into())));
        let err = get_image_orientation(&backend, Path::new("/a.jpg")).unwrap_err();
        assert!(matches!(err, OrientationError::Field(_)));
    }

    #[test]
    fn plan_thumbnail_ignores_orientation_without_auto_rotate() {
        let params = plan_thumbnail(
            Path::new("/source.jpg"),
            Path::new("/thumb.jpg"),
            &ThumbnailConfig::default(),
            Some(ExifOrientation::Rotate90),
        );
        assert_eq!(params.size, Dimensions::new(320, 240));
        assert_eq!(params.orientation, None);
    }

    #[test]
    fn create_thumbnail_skips_orientation_read_by_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new();
        let output = tmp.path().join("out/thumb.jpg");

        create_image_thumbnail(
            &backend,
            Path::new("/source.jpg"),
            &output,
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert!(tmp.path().join("out").is_dir());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail {
                width: 320,
                height: 240,
                orientation: None,
                ..
            }
        ));
    }

    #[test]
    fn create_thumbnail_auto_rotates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::with_orientation(Ok(Some(6)));
        let config = ThumbnailConfig {
            size: Dimensions::new(100, 100),
            auto_rotate: true,
        };

        let params = create_image_thumbnail(
            &backend,
            Path::new("/source.jpg"),
            &tmp.path().join("thumb.jpg"),
            &config,
        )
        .unwrap();

        assert_eq!(params.orientation, Some(ExifOrientation::Rotate90));
        let ops = backend.get_operations();
        assert!(matches!(&ops[0], RecordedOp::ReadOrientation(_)));
        assert!(matches!(&ops[1], RecordedOp::Thumbnail { .. }));
    }

    #[test]
    fn create_thumbnail_normal_orientation_is_noop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::with_orientation(Ok(Some(1)));
        let config = ThumbnailConfig {
            auto_rotate: true,
            ..ThumbnailConfig::default()
        };

        let params = create_image_thumbnail(
            &backend,
            Path::new("/source.jpg"),
            &tmp.path().join("thumb.jpg"),
            &config,
        )
        .unwrap();
        assert_eq!(params.orientation, None);
    }

    #[test]
    fn create_thumbnail_wraps_backend_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::failing();

        let err = create_image_thumbnail(
            &backend,
            Path::new("/source.jpg"),
            &tmp.path().join("thumb.jpg"),
            &ThumbnailConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ThumbnailError::Backend(_)));
        assert!(err.to_string().starts_with("Thumbnail creation failed"));
    }

    #[test]
    fn create_thumbnail_reports_directory_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = create_image_thumbnail(
            &MockBackend::new(),
            Path::new("/source.jpg"),
            &blocker.join("thumb.jpg"),
            &ThumbnailConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ThumbnailError::CreateDir { .. }));
        assert!(err.to_string().contains("Could not create output directory"));
    }
}
