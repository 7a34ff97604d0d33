//! Video processing via the ffmpeg and ffprobe command-line tools.
//!
//! | Operation | Tool |
//! |---|---|
//! | **Probe** | `ffprobe -show_streams -of json` → [`StreamInfo`] |
//! | **Thumbnail** | `ffmpeg -frames:v 1 -c:v mjpeg` |
//! | **GIF preview** | `ffmpeg` palettegen + paletteuse (two passes) |
//! | **HLS** | `ffmpeg -f hls`, stream copy unless filters apply |
//!
//! The module is split into:
//! - **Probe**: ffprobe report parsing; failures collapse to a sentinel
//! - **Filters**: rotation resolver and ordered filter chains
//! - **Runner**: [`FfmpegRunner`] trait + [`CommandRunner`]
//! - **Operations**: `plan_*` functions (pure) and their executing wrappers

pub mod filters;
pub mod operations;
pub mod probe;
pub mod runner;

pub use filters::{FilterChain, FilterStep, RotationPlan, Transpose, resolve_rotation};
pub use operations::{
    GifOptions, HlsOptions, HlsOutput, VideoError, VideoThumbnailOptions, convert_to_hls,
    create_gif_preview, create_video_thumbnail, plan_gif_preview, plan_hls, plan_video_thumbnail,
};
pub use probe::{StreamInfo, probe_stream};
pub use runner::{CommandRunner, FfmpegCommand, FfmpegRunner, RunnerError};
