//! Filter chains for the ffmpeg `-vf` option.
//!
//! A chain is assembled from three slots that are always emitted in the same
//! order: rotation, frame rate, then scale/crop. Rotation has to run first
//! because the scale targets are expressed in display orientation.
//!
//! Rotation hints map to ffmpeg `transpose` steps:
//!
//! | Raw hint | Steps | Effective size |
//! |---|---|---|
//! | -90 | `transpose=1` | height × width |
//! | 90 | `transpose=2` | height × width |
//! | 180, -180 | `transpose=1,transpose=1` | height × width |
//! | anything else | none | width × height |

use super::probe::StreamInfo;
use crate::geometry::{Dimensions, NamedResolution, plan_downscale};
use std::fmt;

/// Direction argument for ffmpeg's `transpose` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    /// `transpose=1`
    Clockwise,
    /// `transpose=2`
    CounterClockwise,
}

/// One geometric or timing step in a filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    Transpose(Transpose),
    Fps(u32),
    /// Scale to cover the box, then center-crop to exactly the box.
    CoverCrop(Dimensions),
    /// Scale down to fit inside the bound, then round both edges down to even.
    FitEven(Dimensions),
}

impl FilterStep {
    pub fn is_rotation(&self) -> bool {
        matches!(self, Self::Transpose(_))
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::CoverCrop(_) | Self::FitEven(_))
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transpose(Transpose::Clockwise) => f.write_str("transpose=1"),
            Self::Transpose(Transpose::CounterClockwise) => f.write_str("transpose=2"),
            Self::Fps(fps) => write!(f, "fps={fps}"),
            Self::CoverCrop(Dimensions { width, height }) => write!(
                f,
                "scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}"
            ),
            Self::FitEven(Dimensions { width, height }) => write!(
                f,
                "scale={width}:{height}:force_original_aspect_ratio=decrease,scale=trunc(iw/2)*2:trunc(ih/2)*2"
            ),
        }
    }
}

/// Outcome of resolving a stream's rotation hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    pub steps: Vec<FilterStep>,
    /// Display size after the steps run.
    pub effective: Dimensions,
}

impl RotationPlan {
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Transpose steps for a raw rotation hint; empty for unrecognized values.
pub fn rotation_steps(raw: i64) -> Vec<FilterStep> {
    use FilterStep::Transpose as T;
    match raw {
        -90 => vec![T(Transpose::Clockwise)],
        90 => vec![T(Transpose::CounterClockwise)],
        180 | -180 => vec![T(Transpose::Clockwise), T(Transpose::Clockwise)],
        _ => Vec::new(),
    }
}

/// Resolve the rotation for a probed stream.
///
/// With `auto_rotate` off, or an unrecognized hint, the natural dimensions are
/// kept and no steps are produced. Any recognized hint swaps the effective
/// dimensions, the 180° cases included.
pub fn resolve_rotation(info: &StreamInfo, auto_rotate: bool) -> RotationPlan {
    let natural = info.dimensions();
    let steps = if auto_rotate {
        rotation_steps(info.rotation)
    } else {
        Vec::new()
    };
    let effective = if steps.is_empty() {
        natural
    } else {
        natural.swapped()
    };
    RotationPlan { steps, effective }
}

/// Step for a named-resolution rendition, or `None` when the source fits.
pub fn downscale_step(source: Dimensions, resolution: NamedResolution) -> Option<FilterStep> {
    let plan = plan_downscale(source, resolution)?;
    log::debug!(
        "{resolution} rendition: {source} fits {} as {}",
        plan.bound,
        plan.output
    );
    Some(FilterStep::FitEven(plan.bound))
}

/// Collects steps into fixed slots; [`build`](Self::build) emits them in
/// rotation → fps → geometry order regardless of call order.
#[derive(Debug, Clone, Default)]
pub struct FilterChainBuilder {
    rotation: Vec<FilterStep>,
    fps: Option<u32>,
    geometry: Vec<FilterStep>,
}

impl FilterChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation(mut self, plan: &RotationPlan) -> Self {
        self.rotation = plan.steps.clone();
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn cover_crop(mut self, size: Option<Dimensions>) -> Self {
        self.geometry.extend(size.map(FilterStep::CoverCrop));
        self
    }

    pub fn geometry(mut self, step: Option<FilterStep>) -> Self {
        self.geometry.extend(step);
        self
    }

    pub fn build(self) -> FilterChain {
        let steps = self
            .rotation
            .into_iter()
            .chain(self.fps.map(FilterStep::Fps))
            .chain(self.geometry)
            .collect();
        FilterChain { steps }
    }
}

/// An ordered filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterChain {
    steps: Vec<FilterStep>,
}

impl FilterChain {
    pub fn builder() -> FilterChainBuilder {
        FilterChainBuilder::new()
    }

    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The `-vf` argument, or `None` for an empty chain.
    pub fn to_arg(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(w: u32, h: u32, rot: i64) -> StreamInfo {
        StreamInfo::new(w, h, rot)
    }

    #[test]
    fn recognized_rotations_swap_dimensions() {
        for raw in [-90, 90, 180, -180] {
            let plan = resolve_rotation(&info(1920, 1080, raw), true);
            assert_eq!(plan.effective, Dimensions::new(1080, 1920), "raw {raw}");
            assert!(!plan.is_identity());
        }
    }

    #[test]
    fn other_rotations_are_ignored() {
        for raw in [0, 45, 270, 360, -270, 1] {
            let plan = resolve_rotation(&info(1920, 1080, raw), true);
            assert_eq!(plan.effective, Dimensions::new(1920, 1080), "raw {raw}");
            assert!(plan.is_identity());
        }
    }

    #[test]
    fn auto_rotate_off_keeps_natural_dimensions() {
        let plan = resolve_rotation(&info(100, 200, 90), false);
        assert!(plan.is_identity());
        assert_eq!(plan.effective, Dimensions::new(100, 200));
    }

    #[test]
    fn rotation_step_table() {
        let render = |raw| {
            rotation_steps(raw)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        assert_eq!(render(-90), "transpose=1");
        assert_eq!(render(90), "transpose=2");
        assert_eq!(render(180), "transpose=1,transpose=1");
        assert_eq!(render(-180), "transpose=1,transpose=1");
        assert_eq!(render(0), "");
    }

    #[test]
    fn sentinel_info_never_rotates() {
        let plan = resolve_rotation(&StreamInfo::UNKNOWN, true);
        assert!(plan.is_identity());
        assert_eq!(plan.effective, Dimensions::default());
    }

    #[test]
    fn chain_orders_rotation_first_regardless_of_calls() {
        let rotation = resolve_rotation(&info(100, 200, -90), true);
        let chain = FilterChain::builder()
            .cover_crop(Some(Dimensions::new(16, 32)))
            .fps(10)
            .rotation(&rotation)
            .build();

        assert_eq!(
            chain.to_string(),
            "transpose=1,fps=10,scale=16:32:force_original_aspect_ratio=increase,crop=16:32"
        );
        let first_geometry = chain.steps().iter().position(FilterStep::is_geometry).unwrap();
        let last_rotation = chain.steps().iter().rposition(FilterStep::is_rotation).unwrap();
        assert!(last_rotation < first_geometry);
    }

    #[test]
    fn empty_chain_has_no_arg() {
        assert_eq!(FilterChain::builder().build().to_arg(), None);
        assert_eq!(
            FilterChain::builder().fps(5).build().to_arg(),
            Some("fps=5".to_string())
        );
    }

    #[test]
    fn downscale_step_for_portrait() {
        let step = downscale_step(Dimensions::new(500, 1000), NamedResolution::Sd).unwrap();
        assert_eq!(step, FilterStep::FitEven(Dimensions::new(480, 854)));
        assert_eq!(
            step.to_string(),
            "scale=480:854:force_original_aspect_ratio=decrease,scale=trunc(iw/2)*2:trunc(ih/2)*2"
        );
    }

    #[test]
    fn downscale_step_absent_when_source_fits() {
        assert_eq!(downscale_step(Dimensions::new(320, 240), NamedResolution::Hd), None);
    }
}
