//! Batch thumbnail generation for a directory tree.
//!
//! Walks the input directory, classifies every file by MIME type, and renders
//! one exactly-sized JPEG thumbnail per image or video. The output tree
//! mirrors the input tree:
//!
//! ```text
//! media/                      thumbs/
//! ├── trip/                   ├── trip/
//! │   ├── 001.jpg      →      │   ├── 001.jpg
//! │   └── beach.mp4    →      │   └── beach.jpg
//! └── notes.txt               (skipped)
//! ```
//!
//! Files are processed in parallel on the global rayon pool. A failing file
//! is reported as a [`BatchEvent::Failed`] and counted; it never aborts the
//! rest of the batch.

use crate::imaging::{ImageBackend, ThumbnailConfig, ThumbnailError, create_image_thumbnail};
use crate::mime::MediaKind;
use crate::video::{FfmpegRunner, VideoError, VideoThumbnailOptions, create_video_thumbnail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Failure for a single file; reported through events, not returned.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Image(#[from] ThumbnailError),
    #[error(transparent)]
    Video(#[from] VideoError),
}

/// Settings for a batch run, usually derived from [`crate::config::MediaConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    pub thumbnail: ThumbnailConfig,
    /// Seek position for video frames, in seconds.
    pub video_time: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailConfig::default(),
            video_time: 1.0,
        }
    }
}

impl From<&crate::config::MediaConfig> for BatchConfig {
    fn from(config: &crate::config::MediaConfig) -> Self {
        Self {
            thumbnail: ThumbnailConfig {
                size: config.thumbnails.dimensions(),
                auto_rotate: config.thumbnails.auto_rotate,
            },
            video_time: config.thumbnails.video_time,
        }
    }
}

/// A media file discovered under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub source: PathBuf,
    /// Path relative to the input root.
    pub relative: PathBuf,
    pub kind: MediaKind,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
        skipped: usize,
    },
    Generated {
        /// 1-based position in discovery order.
        index: usize,
        kind: MediaKind,
        relative: PathBuf,
        output: PathBuf,
    },
    Failed {
        index: usize,
        relative: PathBuf,
        error: String,
    },
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub generated: usize,
    pub failed: usize,
    /// Files that are neither images nor videos.
    pub skipped: usize,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Discover media files under `root`, sorted by path.
///
/// Returns the media items and the number of non-media files skipped.
pub fn collect_media(root: &Path) -> Result<(Vec<MediaItem>, usize), BatchError> {
    if !root.is_dir() {
        return Err(BatchError::NotFound(root.to_path_buf()));
    }

    let mut items = Vec::new();
    let mut skipped = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let kind = MediaKind::of(path);
        if kind == MediaKind::Other {
            skipped += 1;
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        items.push(MediaItem {
            source: path.to_path_buf(),
            relative,
            kind,
        });
    }
    Ok((items, skipped))
}

/// Output location for an item: the relative path under `output_dir`, as `.jpg`.
pub fn thumbnail_output_path(output_dir: &Path, relative: &Path) -> PathBuf {
    output_dir.join(relative).with_extension("jpg")
}

fn render_item(
    backend: &impl ImageBackend,
    runner: &impl FfmpegRunner,
    item: &MediaItem,
    output: &Path,
    config: &BatchConfig,
) -> Result<(), ItemError> {
    match item.kind {
        MediaKind::Image => {
            create_image_thumbnail(backend, &item.source, output, &config.thumbnail)?;
        }
        MediaKind::Video => {
            let options = VideoThumbnailOptions {
                time: config.video_time,
                size: Some(config.thumbnail.size),
                auto_rotate: config.thumbnail.auto_rotate,
            };
            create_video_thumbnail(runner, &item.source, output, &options)?;
        }
        MediaKind::Other => {}
    }
    Ok(())
}

/// Generate thumbnails for every image and video under `input_dir`.
///
/// Only a missing input directory or a failed walk is an error; per-file
/// failures are counted in the summary and sent as events.
pub fn thumbnail_dir(
    backend: &impl ImageBackend,
    runner: &impl FfmpegRunner,
    input_dir: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let (items, skipped) = collect_media(input_dir)?;
    log::debug!(
        "batch: {} media files, {} skipped under {}",
        items.len(),
        skipped,
        input_dir.display()
    );

    let send = |event: BatchEvent| {
        if let Some(tx) = &progress {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started {
        total: items.len(),
        skipped,
    });

    let outcomes: Vec<bool> = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| {
            let output = thumbnail_output_path(output_dir, &item.relative);
            match render_item(backend, runner, item, &output, config) {
                Ok(()) => {
                    send(BatchEvent::Generated {
                        index: i + 1,
                        kind: item.kind,
                        relative: item.relative.clone(),
                        output,
                    });
                    true
                }
                Err(e) => {
                    log::warn!("{}: {e}", item.source.display());
                    send(BatchEvent::Failed {
                        index: i + 1,
                        relative: item.relative.clone(),
                        error: e.to_string(),
                    });
                    false
                }
            }
        })
        .collect();

    let generated = outcomes.iter().filter(|ok| **ok).count();
    Ok(BatchSummary {
        generated,
        failed: outcomes.len() - generated,
        skipped,
    })
}
