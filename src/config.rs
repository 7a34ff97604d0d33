//! Tool configuration.
//!
//! Handles loading, validating, and merging `mediaprep.toml`. Stock defaults
//! are overridden by the user file, which only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tools]
//! ffmpeg = "ffmpeg"          # ffmpeg binary (name on PATH or absolute path)
//! ffprobe = "ffprobe"        # ffprobe binary
//!
//! [thumbnails]
//! size = [320, 240]          # Exact output size (width, height)
//! auto_rotate = false        # Undo EXIF / stream rotation first
//! video_time = 1.0           # Seek position for video thumbnails (seconds)
//!
//! [gif]
//! start = 0.0                # Clip start (seconds)
//! duration = 5.0             # Clip length (seconds)
//! fps = 10
//! # size = [320, 240]        # Optional exact size
//!
//! [hls]
//! segment_time = 10          # Segment length (seconds)
//! # resolution = "720p"      # Optional downscale bound
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::geometry::{Dimensions, NamedResolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mediaprep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `mediaprep.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// External binaries.
    pub tools: ToolsConfig,
    /// Image and video thumbnail settings.
    pub thumbnails: ThumbnailsConfig,
    /// GIF preview settings.
    pub gif: GifConfig,
    /// HLS packaging settings.
    pub hls: HlsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl MediaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.size.contains(&0) {
            return Err(ConfigError::Validation(
                "thumbnails.size values must be non-zero".into(),
            ));
        }
        if self.gif.size.is_some_and(|s| s.contains(&0)) {
            return Err(ConfigError::Validation(
                "gif.size values must be non-zero".into(),
            ));
        }
        if self.gif.fps == 0 {
            return Err(ConfigError::Validation("gif.fps must be non-zero".into()));
        }
        if !(self.gif.duration > 0.0) {
            return Err(ConfigError::Validation(
                "gif.duration must be positive".into(),
            ));
        }
        if self.gif.start < 0.0 || self.thumbnails.video_time < 0.0 {
            return Err(ConfigError::Validation(
                "seek positions must not be negative".into(),
            ));
        }
        if self.hls.segment_time == 0 {
            return Err(ConfigError::Validation(
                "hls.segment_time must be non-zero".into(),
            ));
        }
        if let Some(label) = &self.hls.resolution {
            label
                .parse::<NamedResolution>()
                .map_err(|e| ConfigError::Validation(format!("hls.resolution: {e}")))?;
        }
        Ok(())
    }
}

/// External binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Thumbnail settings shared by images and videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Exact output size as `[width, height]`.
    pub size: [u32; 2],
    pub auto_rotate: bool,
    /// Seek position for video thumbnails, in seconds.
    pub video_time: f64,
}

impl ThumbnailsConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.size[0], self.size[1])
    }
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: [320, 240],
            auto_rotate: false,
            video_time: 1.0,
        }
    }
}

/// GIF preview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    pub start: f64,
    pub duration: f64,
    pub fps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[u32; 2]>,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            duration: 5.0,
            fps: 10,
            size: None,
        }
    }
}

/// HLS packaging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HlsConfig {
    pub segment_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            segment_time: 10,
            resolution: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch runs.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(MediaConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<MediaConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MediaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `mediaprep.toml` in `cwd` is
/// used when present and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<MediaConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                return resolve_config(None);
            }
            candidate
        }
    };
    log::debug!("loading config from {}", path.display());
    let content = fs::read_to_string(&path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(overlay))
}

/// Returns a fully-commented stock `mediaprep.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mediaprep configuration
# ======================
#
# Every key is optional; values shown are the defaults.

# External binaries: a name found on PATH, or an absolute path.
[tools]
ffmpeg = "ffmpeg"
ffprobe = "ffprobe"

# Thumbnails are always exactly `size`: scaled to cover, then center-cropped.
[thumbnails]
size = [320, 240]
# Undo EXIF orientation (images) or rotation metadata (videos) first.
# Also the default for the gif and hls commands.
auto_rotate = false
# Seek position for video thumbnails, in seconds.
video_time = 1.0

# Two-pass palette GIF previews.
[gif]
start = 0.0
duration = 5.0
fps = 10
# size = [320, 240]

# HLS packaging. Streams are copied unless rotation or scaling applies.
[hls]
segment_time = 10
# Downscale bound: 8k, 4k, 1080p, 720p, 540p, 480p, 360p, 240p, 144p.
# Portrait videos use the bound rotated. Smaller videos are never upscaled.
# resolution = "720p"

# Batch processing.
[processing]
# max_processes = 4
"##
}
