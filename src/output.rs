//! CLI output formatting.
//!
//! Every command prints a short, result-first summary. Paths and the exact
//! ffmpeg invocations are shown as indented context below it:
//!
//! ```text
//! Thumbnail 320x240 → thumbs/dawn.jpg
//!     Source: photos/dawn.jpg
//!     Orientation: 6 (rotate_90)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Batch: 3 media files (1 skipped)
//! 001 image trip/001.jpg → thumbs/trip/001.jpg
//! 002 FAILED trip/broken.png
//!     Thumbnail creation failed: ...
//! 003 video trip/beach.mp4 → thumbs/trip/beach.jpg
//! Generated 2, failed 1, skipped 1
//! ```
//!
//! Batch events arrive in completion order, so the index is the file's
//! position in discovery order rather than a line counter.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and, where the CLI needs one, a `print_*` wrapper that
//! writes to stdout. Format functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::ThumbnailParams;
use crate::mime::MediaKind;
use crate::orientation::RotationDegrees;
use crate::video::{FfmpegCommand, HlsOutput};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Other => "other",
    }
}

/// One indented `ffmpeg …` line per command.
pub fn format_commands(commands: &[FfmpegCommand]) -> Vec<String> {
    commands
        .iter()
        .map(|cmd| format!("{}{}", indent(1), cmd))
        .collect()
}

// ============================================================================
// Single-file commands
// ============================================================================

pub fn format_image_thumbnail(params: &ThumbnailParams) -> Vec<String> {
    let mut lines = vec![
        format!("Thumbnail {} → {}", params.size, params.output.display()),
        format!("{}Source: {}", indent(1), params.source.display()),
    ];
    if let Some(orientation) = params.orientation {
        lines.push(format!("{}Orientation: {}", indent(1), orientation));
    }
    lines
}

pub fn print_image_thumbnail(params: &ThumbnailParams) {
    for line in format_image_thumbnail(params) {
        println!("{}", line);
    }
}

/// ```text
/// photos/dawn.jpg: 90°
/// ```
pub fn format_orientation(path: &Path, rotation: RotationDegrees) -> String {
    format!("{}: {}°", path.display(), rotation)
}

/// Unknown types print as `unknown` so the line is never empty.
pub fn format_mimetype(path: &Path, mime: Option<&str>) -> String {
    format!("{}: {}", path.display(), mime.unwrap_or("unknown"))
}

/// Header line plus the commands that produced `output`.
pub fn format_video_result(title: &str, output: &Path, commands: &[FfmpegCommand]) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", title, output.display())];
    lines.extend(format_commands(commands));
    lines
}

pub fn print_video_result(title: &str, output: &Path, commands: &[FfmpegCommand]) {
    for line in format_video_result(title, output, commands) {
        println!("{}", line);
    }
}

pub fn format_hls_output(output: &HlsOutput) -> Vec<String> {
    let mut lines = vec![
        format!("HLS playlist → {}", output.playlist.display()),
        format!("{}Segments: {}", indent(1), output.segment_pattern.display()),
    ];
    lines.extend(format_commands(std::slice::from_ref(&output.command)));
    lines
}

pub fn print_hls_output(output: &HlsOutput) {
    for line in format_hls_output(output) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, skipped } => {
            vec![format!("Batch: {} media files ({} skipped)", total, skipped)]
        }
        BatchEvent::Generated {
            index,
            kind,
            relative,
            output,
        } => vec![format!(
            "{} {} {} → {}",
            format_index(*index),
            kind_label(*kind),
            relative.display(),
            output.display()
        )],
        BatchEvent::Failed {
            index,
            relative,
            error,
        } => vec![
            format!("{} FAILED {}", format_index(*index), relative.display()),
            format!("{}{}", indent(1), error),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Generated {}, failed {}, skipped {}",
        summary.generated, summary.failed, summary.skipped
    )
}
