//! Stream metadata from ffprobe.
//!
//! Only three facts are needed from the first video stream: natural width,
//! natural height, and the rotation hint. The hint comes from the stream's
//! `tags.rotate` entry (older muxers) or a `side_data_list[].rotation` entry
//! (display matrix); the tag wins when both exist.
//!
//! ffprobe is inconsistent about types (`"width": "100"` and `"rotate": "90"`
//! are both seen in the wild), so numeric fields accept strings too.
//!
//! Probing is best-effort: [`probe_stream`] never fails. Any problem yields
//! [`StreamInfo::UNKNOWN`] and the caller proceeds without auto-rotation.

use super::runner::{FfmpegRunner, RunnerError};
use crate::geometry::Dimensions;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("malformed ffprobe output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no video stream")]
    NoVideoStream,
    #[error("video stream has no usable {0}")]
    MissingDimension(&'static str),
}

/// What the resolver needs to know about a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Raw rotation hint in degrees; 0 when absent or malformed.
    pub rotation: i64,
}

impl StreamInfo {
    /// Sentinel for "probe failed": no dimensions, no rotation.
    pub const UNKNOWN: StreamInfo = StreamInfo {
        width: 0,
        height: 0,
        rotation: 0,
    };

    pub fn new(width: u32, height: u32, rotation: i64) -> Self {
        Self {
            width,
            height,
            rotation,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<Value>,
    height: Option<Value>,
    #[serde(default)]
    tags: HashMap<String, Value>,
    #[serde(default)]
    side_data_list: Vec<HashMap<String, Value>>,
}

/// Integer from a JSON number or numeric string.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn dimension(value: Option<&Value>, name: &'static str) -> Result<u32, ProbeError> {
    value
        .and_then(as_int)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(ProbeError::MissingDimension(name))
}

/// Parse an ffprobe JSON report into [`StreamInfo`].
pub fn parse_probe_report(json: &str) -> Result<StreamInfo, ProbeError> {
    let report: ProbeReport = serde_json::from_str(json)?;
    let stream = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoVideoStream)?;

    let width = dimension(stream.width.as_ref(), "width")?;
    let height = dimension(stream.height.as_ref(), "height")?;

    // A present but malformed tag resolves to 0 without consulting side data.
    let rotation = match stream.tags.get("rotate") {
        Some(tag) => as_int(tag),
        None => stream
            .side_data_list
            .iter()
            .find_map(|sd| sd.get("rotation"))
            .and_then(as_int),
    }
    .unwrap_or(0);

    Ok(StreamInfo::new(width, height, rotation))
}

/// Probe the first video stream, absorbing every failure into
/// [`StreamInfo::UNKNOWN`].
pub fn probe_stream(runner: &impl FfmpegRunner, path: &Path) -> StreamInfo {
    let result = runner
        .probe(path)
        .map_err(ProbeError::from)
        .and_then(|json| parse_probe_report(&json));

    match result {
        Ok(info) => {
            log::debug!(
                "probed {}: {}x{} rotate={}",
                path.display(),
                info.width,
                info.height,
                info.rotation
            );
            info
        }
        Err(e) => {
            log::warn!("probe failed for {}, continuing without rotation: {e}", path.display());
            StreamInfo::UNKNOWN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::runner::tests::MockRunner;

    #[test]
    fn tag_rotation_as_string() {
        let json = r#"{"streams": [{"codec_type": "video", "width": "100", "height": "200",
            "tags": {"rotate": "90"}, "side_data_list": []}]}"#;
        assert_eq!(parse_probe_report(json).unwrap(), StreamInfo::new(100, 200, 90));
    }

    #[test]
    fn side_data_rotation() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 50, "height": 60,
            "tags": {}, "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -180}]}]}"#;
        assert_eq!(parse_probe_report(json).unwrap(), StreamInfo::new(50, 60, -180));
    }

    #[test]
    fn tag_wins_over_side_data() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 10, "height": 20,
            "tags": {"rotate": "-90"}, "side_data_list": [{"rotation": 180}]}]}"#;
        assert_eq!(parse_probe_report(json).unwrap().rotation, -90);
    }

    #[test]
    fn no_rotation_hint() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 10, "height": 20}]}"#;
        assert_eq!(parse_probe_report(json).unwrap(), StreamInfo::new(10, 20, 0));
    }

    #[test]
    fn malformed_rotation_is_zero() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 10, "height": 20,
            "tags": {"rotate": "sideways"}}]}"#;
        assert_eq!(parse_probe_report(json).unwrap().rotation, 0);
    }

    #[test]
    fn malformed_tag_does_not_fall_back_to_side_data() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 10, "height": 20,
            "tags": {"rotate": "sideways"}, "side_data_list": [{"rotation": 90}]}]}"#;
        assert_eq!(parse_probe_report(json).unwrap().rotation, 0);
    }

    #[test]
    fn skips_audio_streams() {
        let json = r#"{"streams": [
            {"codec_type": "audio"},
            {"codec_type": "video", "width": 1920, "height": 1080}
        ]}"#;
        assert_eq!(parse_probe_report(json).unwrap().dimensions(), Dimensions::new(1920, 1080));
    }

    #[test]
    fn missing_video_stream_is_error() {
        let err = parse_probe_report(r#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, ProbeError::NoVideoStream));
    }

    #[test]
    fn missing_width_is_error() {
        let json = r#"{"streams": [{"codec_type": "video", "height": 20}]}"#;
        assert!(matches!(
            parse_probe_report(json),
            Err(ProbeError::MissingDimension("width"))
        ));
    }

    #[test]
    fn probe_failure_returns_sentinel() {
        let runner = MockRunner::broken_probe();
        assert_eq!(probe_stream(&runner, Path::new("in.mp4")), StreamInfo::UNKNOWN);
    }

    #[test]
    fn garbage_output_returns_sentinel() {
        let runner = MockRunner::with_probe("not json at all");
        assert_eq!(probe_stream(&runner, Path::new("in.mp4")), StreamInfo::UNKNOWN);
    }

    #[test]
    fn no_video_stream_returns_sentinel() {
        let runner = MockRunner::with_probe(r#"{"streams": [{"codec_type": "audio"}]}"#);
        assert_eq!(probe_stream(&runner, Path::new("in.mp4")), StreamInfo::UNKNOWN);
    }
}
