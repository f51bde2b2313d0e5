//! Display-rotation metadata to orientation-correcting filter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probe::ProbedMetadata;

/// How decoded frames must be transformed so that playback is upright on
/// players that ignore rotation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrientationDirective {
    /// Frames are already upright.
    #[default]
    None,
    Rotate90Cw,
    Rotate180,
    Rotate90Ccw,
}

impl OrientationDirective {
    /// Map a rotation angle in degrees to a directive.
    ///
    /// Only the canonical angles are recognised; anything else (including
    /// non-integral values) yields [`OrientationDirective::None`].
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() || degrees.fract() != 0.0 {
            return Self::None;
        }
        match degrees as i64 {
            90 | -270 => Self::Rotate90Cw,
            180 | -180 => Self::Rotate180,
            270 | -90 => Self::Rotate90Ccw,
            _ => Self::None,
        }
    }

    /// The ffmpeg video filter chain for this directive, or `None` when no
    /// transform is needed.
    pub fn filter(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Rotate90Cw => Some("transpose=1"),
            Self::Rotate180 => Some("transpose=2,transpose=2"),
            Self::Rotate90Ccw => Some("transpose=2"),
        }
    }
}

impl fmt::Display for OrientationDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Rotate90Cw => "rotate 90° clockwise",
            Self::Rotate180 => "rotate 180°",
            Self::Rotate90Ccw => "rotate 90° counter-clockwise",
        };
        f.write_str(s)
    }
}

/// Resolve the directive for the primary video stream of `metadata`.
///
/// The `rotate` tag wins over display-matrix side data when both are
/// present. Missing metadata resolves to [`OrientationDirective::None`].
pub fn resolve_orientation(metadata: &ProbedMetadata) -> OrientationDirective {
    metadata
        .primary_video()
        .and_then(|v| v.tag_rotation.or(v.side_data_rotation))
        .map(OrientationDirective::from_degrees)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbedStream, StreamKind};

    fn video(tag: Option<f64>, side_data: Option<f64>) -> ProbedMetadata {
        ProbedMetadata {
            format_name: Some("mov,mp4,m4a,3gp,3g2,mj2".into()),
            duration: None,
            streams: vec![ProbedStream {
                index: 0,
                kind: StreamKind::Video,
                codec_name: Some("h264".into()),
                width: Some(1920),
                height: Some(1080),
                tag_rotation: tag,
                side_data_rotation: side_data,
                attached_pic: false,
            }],
        }
    }

    #[test]
    fn tag_90_is_clockwise() {
        assert_eq!(resolve_orientation(&video(Some(90.0), None)), OrientationDirective::Rotate90Cw);
    }

    #[test]
    fn tag_minus_270_is_clockwise() {
        assert_eq!(resolve_orientation(&video(Some(-270.0), None)), OrientationDirective::Rotate90Cw);
    }

    #[test]
    fn tag_180_is_half_turn() {
        assert_eq!(resolve_orientation(&video(Some(180.0), None)), OrientationDirective::Rotate180);
    }

    #[test]
    fn tag_minus_180_is_half_turn() {
        assert_eq!(resolve_orientation(&video(Some(-180.0), None)), OrientationDirective::Rotate180);
    }

    #[test]
    fn tag_270_is_counter_clockwise() {
        assert_eq!(resolve_orientation(&video(Some(270.0), None)), OrientationDirective::Rotate90Ccw);
    }

    #[test]
    fn tag_minus_90_is_counter_clockwise() {
        assert_eq!(resolve_orientation(&video(Some(-90.0), None)), OrientationDirective::Rotate90Ccw);
    }

    #[test]
    fn zero_is_none() {
        assert_eq!(resolve_orientation(&video(Some(0.0), None)), OrientationDirective::None);
    }

    #[test]
    fn absent_is_none() {
        assert_eq!(resolve_orientation(&video(None, None)), OrientationDirective::None);
    }

    #[test]
    fn unmapped_values_are_none() {
        for deg in [45.0, 360.0, -360.0, 450.0, 1.0, 89.5, f64::NAN, f64::INFINITY] {
            assert_eq!(
                resolve_orientation(&video(Some(deg), None)),
                OrientationDirective::None,
                "{deg}"
            );
        }
    }

    #[test]
    fn side_data_used_when_tag_absent() {
        assert_eq!(resolve_orientation(&video(None, Some(-90.0))), OrientationDirective::Rotate90Ccw);
        assert_eq!(resolve_orientation(&video(None, Some(90.0))), OrientationDirective::Rotate90Cw);
        assert_eq!(resolve_orientation(&video(None, Some(180.0))), OrientationDirective::Rotate180);
    }

    #[test]
    fn tag_takes_precedence_over_side_data() {
        assert_eq!(
            resolve_orientation(&video(Some(90.0), Some(-90.0))),
            OrientationDirective::Rotate90Cw
        );
        assert_eq!(
            resolve_orientation(&video(Some(0.0), Some(180.0))),
            OrientationDirective::None
        );
    }

    #[test]
    fn no_video_stream_is_none() {
        let meta = ProbedMetadata {
            format_name: None,
            duration: None,
            streams: vec![],
        };
        assert_eq!(resolve_orientation(&meta), OrientationDirective::None);
    }

    #[test]
    fn filters() {
        assert_eq!(OrientationDirective::None.filter(), None);
        assert_eq!(OrientationDirective::Rotate90Cw.filter(), Some("transpose=1"));
        assert_eq!(OrientationDirective::Rotate180.filter(), Some("transpose=2,transpose=2"));
        assert_eq!(OrientationDirective::Rotate90Ccw.filter(), Some("transpose=2"));
    }
}
