//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Orientation** | `kamadak-exif` Orientation tag → [`crate::orientation`] table |
//! | **Thumbnail** | `apply_orientation` + `resize_to_fill` |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining planning + backend

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, OrientationError};
pub use operations::{
    ThumbnailError, create_image_thumbnail, get_image_orientation, read_exif_orientation,
};
pub use params::{DEFAULT_THUMBNAIL_SIZE, ThumbnailConfig, ThumbnailParams};
pub use rust_backend::RustBackend;
