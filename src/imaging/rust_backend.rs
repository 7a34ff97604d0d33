//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate |
//! | Orientation tag | `kamadak-exif` (`exif::Reader::read_from_container`) |
//! | Orientation transform | `image::DynamicImage::apply_orientation` |
//! | Thumbnail crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Encode | `image` crate, format inferred from the output extension |

use super::backend::{BackendError, ImageBackend, OrientationError};
use super::params::ThumbnailParams;
use crate::orientation::ExifOrientation;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> BackendError {
    if source.kind() == std::io::ErrorKind::NotFound {
        BackendError::NotFound(path.to_path_buf())
    } else {
        BackendError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(|e| io_error(path, e))?
        .with_guessed_format()
        .map_err(|e| io_error(path, e))?
        .decode()
        .map_err(|e| BackendError::Unidentified {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Whether the magic bytes name an image format with no Exif slot at all.
///
/// JPEG, TIFF, PNG, WebP and HEIF can carry Exif, so a broken block inside
/// one of them is a parse error rather than "no orientation".
fn lacks_exif_support(path: &Path) -> bool {
    let mut head = [0u8; 64];
    let Ok(n) = File::open(path).and_then(|mut f| f.read(&mut head)) else {
        return false;
    };
    matches!(
        image::guess_format(&head[..n]),
        Ok(ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Ico
            | ImageFormat::Pnm
            | ImageFormat::Tga
            | ImageFormat::Dds
            | ImageFormat::Farbfeld
            | ImageFormat::Qoi
            | ImageFormat::Hdr
            | ImageFormat::OpenExr)
    )
}

/// Undo the camera orientation so the pixels are stored upright.
fn orient(img: DynamicImage, orientation: ExifOrientation) -> DynamicImage {
    let mut img = img;
    if let Some(o) = Orientation::from_exif(orientation.code()) {
        img.apply_orientation(o);
    }
    img
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| BackendError::Save {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // JPEG has no alpha channel
    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, format),
        _ => img.save_with_format(path, format),
    };
    result.map_err(|e| BackendError::Save {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl ImageBackend for RustBackend {
    fn read_orientation(&self, path: &Path) -> Result<Option<u32>, OrientationError> {
        let file = File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                OrientationError::NotFound(path.to_path_buf())
            } else {
                OrientationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let mut reader = BufReader::new(file);

        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            // A valid container without an Exif block
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(exif::Error::Io(source)) => {
                return Err(OrientationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
            // GIF, BMP and friends are images without orientation
            Err(exif::Error::InvalidFormat(_)) if lacks_exif_support(path) => return Ok(None),
            Err(e) => {
                return Err(OrientationError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let Some(field) = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) else {
            return Ok(None);
        };
        field.value.get_uint(0).map(Some).ok_or_else(|| {
            OrientationError::Field(format!(
                "unexpected Orientation value {}",
                field.display_value()
            ))
        })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;

        let img = match params.orientation {
            Some(orientation) => orient(img, orientation),
            None => img,
        };

        // Fill-resize then center-crop to exact dimensions
        let filled = img.resize_to_fill(
            params.size.width,
            params.size.height,
            FilterType::Lanczos3,
        );

        save_image(&filled, &params.output)
    }
}
