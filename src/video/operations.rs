//! High-level video operations: thumbnail, GIF preview, HLS rendition.
//!
//! Each operation follows the same shape:
//!
//! 1. validate arguments (unknown resolution labels fail here, before any
//!    directory is created or any tool is run)
//! 2. create the output directory
//! 3. probe the stream (best-effort; see [`probe_stream`])
//! 4. plan the command(s) with a pure `plan_*` function
//! 5. run them through the [`FfmpegRunner`]
//!
//! Every command starts with `-noautorotate` and strips metadata, so the
//! only rotation applied is the one planned here.

use super::filters::{FilterChain, downscale_step, resolve_rotation};
use super::probe::{StreamInfo, probe_stream};
use super::runner::{FfmpegCommand, FfmpegRunner, RunnerError};
use crate::geometry::{
    Dimensions, GeometryError, NamedResolution, parse_resolution, plan_cover_crop,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Could not create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    InvalidResolution(#[from] GeometryError),
    #[error("Thumbnail creation failed: {0}")]
    Thumbnail(#[source] RunnerError),
    #[error("Palette generation failed: {0}")]
    Palette(#[source] RunnerError),
    #[error("GIF creation failed: {0}")]
    Gif(#[source] RunnerError),
    #[error("HLS conversion failed: {0}")]
    Hls(#[source] RunnerError),
}

/// Options for [`create_video_thumbnail`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoThumbnailOptions {
    /// Seek position in seconds.
    pub time: f64,
    pub size: Option<Dimensions>,
    pub auto_rotate: bool,
}

impl Default for VideoThumbnailOptions {
    fn default() -> Self {
        Self {
            time: 1.0,
            size: None,
            auto_rotate: false,
        }
    }
}

/// Options for [`create_gif_preview`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifOptions {
    pub start: f64,
    pub duration: f64,
    pub fps: u32,
    pub size: Option<Dimensions>,
    pub auto_rotate: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            start: 0.0,
            duration: 5.0,
            fps: 10,
            size: None,
            auto_rotate: false,
        }
    }
}

/// Options for [`convert_to_hls`].
#[derive(Debug, Clone, PartialEq)]
pub struct HlsOptions {
    /// Target segment length in seconds.
    pub segment_time: u32,
    /// Named resolution label such as `"720p"`.
    pub resolution: Option<String>,
    pub auto_rotate: bool,
}

impl Default for HlsOptions {
    fn default() -> Self {
        Self {
            segment_time: 10,
            resolution: None,
            auto_rotate: false,
        }
    }
}

/// Files produced by an HLS conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct HlsOutput {
    pub playlist: PathBuf,
    /// printf-style pattern for segment files.
    pub segment_pattern: PathBuf,
    pub command: FfmpegCommand,
}

fn ensure_dir(dir: &Path) -> Result<(), VideoError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| VideoError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Path) -> Result<(), VideoError> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Leading arguments shared by every command.
fn base_command() -> FfmpegCommand {
    FfmpegCommand::new().args(["-y", "-noautorotate"])
}

fn strip_metadata(cmd: FfmpegCommand) -> FfmpegCommand {
    cmd.args(["-map_metadata", "-1", "-map_metadata:s:v:0", "-1"])
}

/// Log the crop window ffmpeg will cut from the displayed frame.
fn log_cover_crop(source: Dimensions, size: Option<Dimensions>) {
    if let Some(target) = size.filter(|_| !source.is_empty()) {
        let plan = plan_cover_crop(source, target);
        log::debug!(
            "cover {source} -> {} then crop {} at +{}+{}",
            plan.scaled,
            plan.output,
            plan.x,
            plan.y
        );
    }
}

/// Plan a single-frame JPEG thumbnail.
pub fn plan_video_thumbnail(
    input: &Path,
    output: &Path,
    info: &StreamInfo,
    options: &VideoThumbnailOptions,
) -> FfmpegCommand {
    let rotation = resolve_rotation(info, options.auto_rotate);
    log_cover_crop(rotation.effective, options.size);
    let chain = FilterChain::builder()
        .rotation(&rotation)
        .cover_crop(options.size)
        .build();

    let mut cmd = strip_metadata(
        base_command()
            .arg("-ss")
            .arg(options.time.to_string())
            .arg("-i")
            .path(input),
    );
    if let Some(vf) = chain.to_arg() {
        cmd = cmd.arg("-vf").arg(vf);
    }
    cmd.args(["-frames:v", "1", "-c:v", "mjpeg", "-q:v", "2", "-an"])
        .path(output)
}

/// Extract one frame at `options.time` as a JPEG thumbnail.
pub fn create_video_thumbnail(
    runner: &impl FfmpegRunner,
    input: &Path,
    output: &Path,
    options: &VideoThumbnailOptions,
) -> Result<FfmpegCommand, VideoError> {
    ensure_parent(output)?;
    let info = probe_stream(runner, input);
    let cmd = plan_video_thumbnail(input, output, &info, options);
    runner.run(&cmd).map_err(VideoError::Thumbnail)?;
    Ok(cmd)
}

/// Palette image used between the two GIF passes.
pub fn palette_path(output: &Path) -> PathBuf {
    output.with_extension("png")
}

/// Plan both passes of a GIF preview: palette generation, then palette use.
pub fn plan_gif_preview(
    input: &Path,
    output: &Path,
    info: &StreamInfo,
    options: &GifOptions,
) -> (FfmpegCommand, FfmpegCommand) {
    let rotation = resolve_rotation(info, options.auto_rotate);
    log_cover_crop(rotation.effective, options.size);
    let vf = FilterChain::builder()
        .rotation(&rotation)
        .fps(options.fps)
        .cover_crop(options.size)
        .build()
        .to_string();
    let palette = palette_path(output);

    let clip = |cmd: FfmpegCommand| {
        cmd.arg("-ss")
            .arg(options.start.to_string())
            .arg("-t")
            .arg(options.duration.to_string())
    };

    let palettegen = strip_metadata(clip(base_command()).arg("-i").path(input))
        .arg("-vf")
        .arg(format!("{vf},palettegen"))
        .path(&palette);

    let paletteuse = strip_metadata(
        clip(base_command())
            .arg("-i")
            .path(input)
            .arg("-i")
            .path(&palette),
    )
    .arg("-filter_complex")
    .arg(format!("[0:v]{vf}[x];[x][1:v]paletteuse"))
    .args(["-loop", "0"])
    .path(output);

    (palettegen, paletteuse)
}

/// Create an optimized two-pass GIF preview of a clip.
///
/// The intermediate palette is removed afterwards, even when the second pass
/// fails.
pub fn create_gif_preview(
    runner: &impl FfmpegRunner,
    input: &Path,
    output: &Path,
    options: &GifOptions,
) -> Result<Vec<FfmpegCommand>, VideoError> {
    ensure_parent(output)?;
    let info = probe_stream(runner, input);
    let (palettegen, paletteuse) = plan_gif_preview(input, output, &info, options);

    runner.run(&palettegen).map_err(VideoError::Palette)?;
    let result = runner.run(&paletteuse).map_err(VideoError::Gif);

    let palette = palette_path(output);
    if let Err(e) = std::fs::remove_file(&palette) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("could not remove palette {}: {e}", palette.display());
        }
    }

    result.map(|()| vec![palettegen, paletteuse])
}

/// Plan an HLS conversion.
///
/// Re-encodes with libx264/aac when any filter applies; otherwise copies the
/// streams untouched.
pub fn plan_hls(
    input: &Path,
    output_dir: &Path,
    base_name: &str,
    info: &StreamInfo,
    resolution: Option<NamedResolution>,
    options: &HlsOptions,
) -> HlsOutput {
    let rotation = resolve_rotation(info, options.auto_rotate);
    let chain = FilterChain::builder()
        .rotation(&rotation)
        .geometry(resolution.and_then(|r| downscale_step(rotation.effective, r)))
        .build();

    let playlist = output_dir.join(format!("{base_name}.m3u8"));
    let segment_pattern = output_dir.join(format!("{base_name}%d.ts"));

    let mut cmd = strip_metadata(base_command().arg("-i").path(input));
    cmd = match chain.to_arg() {
        Some(vf) => cmd.arg("-vf").arg(vf).args([
            "-metadata:s:v:0",
            "rotate=0",
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-strict",
            "-2",
        ]),
        None => cmd.args(["-c", "copy", "-metadata:s:v:0", "rotate=0"]),
    };
    let command = cmd
        .args(["-start_number", "0"])
        .arg("-hls_time")
        .arg(options.segment_time.to_string())
        .args(["-hls_list_size", "0"])
        .arg("-hls_segment_filename")
        .path(&segment_pattern)
        .args(["-f", "hls"])
        .path(&playlist);

    HlsOutput {
        playlist,
        segment_pattern,
        command,
    }
}

/// Package a video as HLS (playlist + MPEG-TS segments), optionally
/// auto-rotated and downscaled to a named resolution.
pub fn convert_to_hls(
    runner: &impl FfmpegRunner,
    input: &Path,
    output_dir: &Path,
    base_name: &str,
    options: &HlsOptions,
) -> Result<HlsOutput, VideoError> {
    let resolution = parse_resolution(options.resolution.as_deref())?;
    ensure_dir(output_dir)?;

    let info = probe_stream(runner, input);
    let output = plan_hls(input, output_dir, base_name, &info, resolution, options);
    runner.run(&output.command).map_err(VideoError::Hls)?;
    Ok(output)
}
