//! # mediaprep
//!
//! Thumbnails, GIF previews and HLS renditions from images and videos, with
//! optional auto-rotation driven by embedded orientation metadata.
//!
//! Images are decoded and resized in-process with the `image` crate. Videos
//! are handled by the `ffmpeg` and `ffprobe` binaries; this crate only plans
//! their argument lists.
//!
//! # Architecture: Probe → Plan → Run
//!
//! Every operation follows the same shape:
//!
//! ```text
//! 1. Probe   source    →  metadata         (EXIF orientation / ffprobe JSON)
//! 2. Plan    metadata  →  parameters       (rotation, filter chain, geometry)
//! 3. Run     plan      →  output file(s)   (image backend / ffmpeg)
//! ```
//!
//! Planning is pure. The I/O at either end sits behind a trait
//! ([`imaging::ImageBackend`], [`video::FfmpegRunner`]) so the planning logic
//! is tested against recording mocks without touching real media.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Dimensions, named resolutions, cover-crop and fit-within-even planners |
//! | [`orientation`] | EXIF orientation states and the rotation-degree table |
//! | [`imaging`] | Image thumbnails and orientation reading (`image` + `kamadak-exif`) |
//! | [`video`] | ffprobe parsing, rotation resolver, filter chains, ffmpeg operations |
//! | [`mime`] | MIME type and media kind from file extensions |
//! | [`config`] | `mediaprep.toml` loading, merging over stock defaults, validation |
//! | [`batch`] | Parallel thumbnails for a whole directory tree |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Probe Failures Are Not Errors
//!
//! A video whose metadata cannot be probed is still processed: the probe
//! collapses to a `(0, 0, 0)` sentinel, which means "no rotation, unknown
//! size", and the operation proceeds without rotation or downscaling. Image
//! orientation is stricter: a file that cannot be read at all is an error,
//! while a file that simply has no orientation tag resolves to 0°.
//!
//! ## Rotation Before Geometry
//!
//! Requested sizes are expressed in display orientation. Filter chains are
//! therefore built with fixed slots (rotation, frame rate, scale/crop) and
//! always rendered in that order, so a caller cannot accidentally scale
//! before rotating.
//!
//! ## Validate Before Side Effects
//!
//! An unknown resolution label is rejected before any directory is created
//! or any external tool is launched.

pub mod batch;
pub mod config;
pub mod geometry;
pub mod imaging;
pub mod mime;
pub mod orientation;
pub mod output;
pub mod video;
