//! Pure dimension math for thumbnails, previews and stream renditions.
//!
//! All functions here are pure and testable without any I/O or media.
//!
//! Two sizing strategies are used:
//!
//! - **Cover + crop** for explicit `(width, height)` targets: scale preserving
//!   aspect ratio until the target box is fully covered, then crop the overflow
//!   symmetrically. Output is always exactly the target size.
//! - **Fit within a named resolution** for HLS renditions: shrink preserving
//!   aspect ratio until both edges are inside the bound, then round each edge
//!   down to an even number (4:2:0 chroma needs even dimensions). Sources that
//!   already fit are left alone; nothing is ever upscaled.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Unknown resolution '{label}'. Valid: {}", NamedResolution::labels().join(", "))]
    UnknownResolution { label: String },
    #[error("Invalid size '{0}': expected WIDTHxHEIGHT with non-zero edges")]
    InvalidSize(String),
}

/// A frame's pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged.
    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    /// Either edge is zero (e.g. the unknown-dimensions probe sentinel).
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if either edge is larger than the matching edge of `bound`.
    pub fn exceeds(self, bound: Dimensions) -> bool {
        self.width > bound.width || self.height > bound.height
    }
}

/// Parses `"320x240"` (an upper-case `X` is accepted too).
impl FromStr for Dimensions {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GeometryError::InvalidSize(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        let dims = Self::new(width, height);
        if dims.is_empty() {
            return Err(invalid());
        }
        Ok(dims)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Standard rendition labels, each a landscape pixel bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedResolution {
    UltraHd8k,
    UltraHd4k,
    FullHd,
    Hd,
    Qhd,
    Sd,
    Nhd,
    Low,
    Lowest,
}

impl NamedResolution {
    /// Largest first.
    pub const ALL: [NamedResolution; 9] = [
        Self::UltraHd8k,
        Self::UltraHd4k,
        Self::FullHd,
        Self::Hd,
        Self::Qhd,
        Self::Sd,
        Self::Nhd,
        Self::Low,
        Self::Lowest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::UltraHd8k => "8k",
            Self::UltraHd4k => "4k",
            Self::FullHd => "1080p",
            Self::Hd => "720p",
            Self::Qhd => "540p",
            Self::Sd => "480p",
            Self::Nhd => "360p",
            Self::Low => "240p",
            Self::Lowest => "144p",
        }
    }

    /// Landscape bound for this label.
    pub fn bound(self) -> Dimensions {
        match self {
            Self::UltraHd8k => Dimensions::new(7680, 4320),
            Self::UltraHd4k => Dimensions::new(3840, 2160),
            Self::FullHd => Dimensions::new(1920, 1080),
            Self::Hd => Dimensions::new(1280, 720),
            Self::Qhd => Dimensions::new(960, 540),
            Self::Sd => Dimensions::new(854, 480),
            Self::Nhd => Dimensions::new(640, 360),
            Self::Low => Dimensions::new(426, 240),
            Self::Lowest => Dimensions::new(256, 144),
        }
    }

    /// Bound oriented to match `source`: swapped when the source is portrait.
    pub fn bound_for(self, source: Dimensions) -> Dimensions {
        let bound = self.bound();
        if source.is_portrait() {
            bound.swapped()
        } else {
            bound
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.label()).collect()
    }
}

impl FromStr for NamedResolution {
    type Err = GeometryError;

    /// Case-insensitive label lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.label() == key)
            .ok_or_else(|| GeometryError::UnknownResolution {
                label: s.to_string(),
            })
    }
}

impl fmt::Display for NamedResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse an optional resolution label, failing on unknown labels.
pub fn parse_resolution(label: Option<&str>) -> Result<Option<NamedResolution>, GeometryError> {
    label.map(str::parse).transpose()
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn cover_dimensions(source: Dimensions, target: Dimensions) -> Dimensions {
    if source.is_empty() || target.is_empty() {
        return target;
    }

    let src_aspect = source.width as f64 / source.height as f64;
    let tgt_aspect = target.width as f64 / target.height as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height matches, width overflows
        let w = (target.height as f64 * src_aspect).round() as u32;
        Dimensions::new(w.max(target.width), target.height)
    } else {
        // Source is taller: width matches, height overflows
        let h = (target.width as f64 / src_aspect).round() as u32;
        Dimensions::new(target.width, h.max(target.height))
    }
}

/// A scale-to-cover followed by a centered crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverCrop {
    /// Intermediate size after the aspect-preserving scale.
    pub scaled: Dimensions,
    /// Final output size; always equals the requested target.
    pub output: Dimensions,
    /// Left edge of the crop window inside `scaled`.
    pub x: u32,
    /// Top edge of the crop window inside `scaled`.
    pub y: u32,
}

/// Plan a scale-to-cover + center-crop to exactly `target`.
pub fn plan_cover_crop(source: Dimensions, target: Dimensions) -> CoverCrop {
    let scaled = cover_dimensions(source, target);
    CoverCrop {
        scaled,
        output: target,
        x: (scaled.width - target.width) / 2,
        y: (scaled.height - target.height) / 2,
    }
}

/// Round down to the nearest even integer.
pub fn floor_even(n: u32) -> u32 {
    n & !1
}

/// Largest aspect-preserving size that fits inside `bound`, with even edges.
///
/// Mirrors ffmpeg's `trunc(iw/2)*2` rounding, so a sliver-thin source can
/// round an edge down to 0.
pub fn fit_within_even(source: Dimensions, bound: Dimensions) -> Dimensions {
    if source.is_empty() {
        return Dimensions::new(floor_even(bound.width), floor_even(bound.height));
    }
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (bw, bh) = (bound.width as u64, bound.height as u64);

    // Integer cross-multiplication keeps the limiting edge exact.
    let (w, h) = if bw * sh <= bh * sw {
        (bw, sh * bw / sw)
    } else {
        (sw * bh / sh, bh)
    };
    Dimensions::new(floor_even(w as u32), floor_even(h as u32))
}

/// A downscale decision for a named-resolution rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downscale {
    /// The bound used for comparison, already oriented to the source.
    pub bound: Dimensions,
    /// Expected output size after fitting and even rounding.
    pub output: Dimensions,
}

/// Decide whether `source` (post-rotation) must shrink to fit `resolution`.
///
/// Returns `None` when the source already fits: renditions never upscale.
pub fn plan_downscale(source: Dimensions, resolution: NamedResolution) -> Option<Downscale> {
    let bound = resolution.bound_for(source);
    source.exceeds(bound).then(|| Downscale {
        bound,
        output: fit_within_even(source, bound),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_strings() {
        assert_eq!("320x240".parse(), Ok(Dimensions::new(320, 240)));
        assert_eq!(" 64X48 ".parse(), Ok(Dimensions::new(64, 48)));
        assert!("320".parse::<Dimensions>().is_err());
        assert!("0x240".parse::<Dimensions>().is_err());
        assert!("axb".parse::<Dimensions>().is_err());
    }

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    // =========================================================================
    // cover_dimensions / plan_cover_crop
    // =========================================================================

    #[test]
    fn cover_wider_source_to_portrait_target() {
        // 800x600 (4:3) → 400x500: height matches, width = 500 * 4/3 = 667
        assert_eq!(cover_dimensions(dims(800, 600), dims(400, 500)), dims(667, 500));
    }

    #[test]
    fn cover_taller_source_to_landscape_target() {
        assert_eq!(cover_dimensions(dims(600, 800), dims(500, 400)), dims(500, 667));
    }

    #[test]
    fn cover_same_aspect_ratio() {
        assert_eq!(cover_dimensions(dims(800, 600), dims(400, 300)), dims(400, 300));
    }

    #[test]
    fn cover_crop_hits_exact_target() {
        let plan = plan_cover_crop(dims(1920, 1080), dims(400, 300));
        assert_eq!(plan.output, dims(400, 300));
        assert_eq!(plan.scaled, dims(533, 300));
        assert_eq!((plan.x, plan.y), (66, 0));
    }

    #[test]
    fn cover_crop_upscales_small_source() {
        let plan = plan_cover_crop(dims(100, 50), dims(320, 240));
        assert_eq!(plan.scaled, dims(480, 240));
        assert_eq!(plan.output, dims(320, 240));
    }

    #[test]
    fn cover_crop_unknown_source_uses_target() {
        let plan = plan_cover_crop(Dimensions::default(), dims(16, 32));
        assert_eq!(plan.scaled, dims(16, 32));
        assert_eq!((plan.x, plan.y), (0, 0));
    }

    // =========================================================================
    // Named resolutions
    // =========================================================================

    #[test]
    fn resolution_table_values() {
        let table: Vec<(&str, Dimensions)> = NamedResolution::ALL
            .iter()
            .map(|r| (r.label(), r.bound()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("8k", dims(7680, 4320)),
                ("4k", dims(3840, 2160)),
                ("1080p", dims(1920, 1080)),
                ("720p", dims(1280, 720)),
                ("540p", dims(960, 540)),
                ("480p", dims(854, 480)),
                ("360p", dims(640, 360)),
                ("240p", dims(426, 240)),
                ("144p", dims(256, 144)),
            ]
        );
    }

    #[test]
    fn resolution_parse_is_case_insensitive() {
        assert_eq!("720P".parse::<NamedResolution>(), Ok(NamedResolution::Hd));
        assert_eq!("4K".parse::<NamedResolution>(), Ok(NamedResolution::UltraHd4k));
    }

    #[test]
    fn unknown_resolution_is_rejected() {
        let err = "999p".parse::<NamedResolution>().unwrap_err();
        assert_eq!(
            err,
            GeometryError::UnknownResolution {
                label: "999p".into()
            }
        );
        assert!(err.to_string().contains("1080p"));
    }

    #[test]
    fn parse_resolution_none_is_ok() {
        assert_eq!(parse_resolution(None), Ok(None));
        assert_eq!(parse_resolution(Some("480p")), Ok(Some(NamedResolution::Sd)));
    }

    // =========================================================================
    // plan_downscale
    // =========================================================================

    #[test]
    fn portrait_source_swaps_bound() {
        let plan = plan_downscale(dims(500, 1000), NamedResolution::Sd).unwrap();
        assert_eq!(plan.bound, dims(480, 854));
        assert!(plan.output.width <= 480 && plan.output.height <= 854);
        assert_eq!(plan.output.width % 2, 0);
        assert_eq!(plan.output.height % 2, 0);
        assert_eq!(plan.output, dims(426, 854));
    }

    #[test]
    fn landscape_source_keeps_bound() {
        let plan = plan_downscale(dims(1920, 1080), NamedResolution::Hd).unwrap();
        assert_eq!(plan.bound, dims(1280, 720));
        assert_eq!(plan.output, dims(1280, 720));
    }

    #[test]
    fn source_within_bound_is_not_scaled() {
        assert_eq!(plan_downscale(dims(640, 360), NamedResolution::Hd), None);
        assert_eq!(plan_downscale(dims(1280, 720), NamedResolution::Hd), None);
    }

    #[test]
    fn one_edge_over_bound_triggers_scale() {
        let plan = plan_downscale(dims(1300, 500), NamedResolution::Hd).unwrap();
        assert_eq!(plan.output.width, 1280);
        assert_eq!(plan.output.height % 2, 0);
    }

    #[test]
    fn extreme_aspect_truncates_like_ffmpeg() {
        assert_eq!(fit_within_even(dims(10000, 2), dims(1280, 720)), dims(1280, 0));
        assert_eq!(fit_within_even(dims(3, 4000), dims(480, 854)), dims(0, 854));
    }

    #[test]
    fn unknown_dimensions_never_scale() {
        assert_eq!(plan_downscale(Dimensions::default(), NamedResolution::Lowest), None);
    }

    #[test]
    fn floor_even_rounds_down() {
        assert_eq!(floor_even(427), 426);
        assert_eq!(floor_even(854), 854);
        assert_eq!(floor_even(1), 0);
    }
}
