//! Aspect ratio comparison between the frame and its aggregated content.
//!
//! Both ratios are rounded to two decimals before comparing, matching how
//! they are reported. A difference strictly greater than the tolerance is a
//! mismatch.

use serde::Serialize;

use crate::config::CoreConfig;
use crate::processing::geometry::{ContentBox, EdgeMargins, FrameSize};

/// Absorbs binary representation noise at the tolerance boundary.
const ROUNDING_SLACK: f64 = 1e-9;

/// Final classification of one video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum AspectVerdict {
    /// Content fills the frame's nominal aspect ratio.
    Matched { original_aspect: f64 },
    /// Bars are baked into the picture.
    Mismatched {
        original_aspect: f64,
        content_aspect: f64,
        margins: EdgeMargins,
    },
    /// No usable samples; nothing can be said about the content.
    Unknown,
}

impl AspectVerdict {
    #[must_use]
    pub fn is_mismatched(&self) -> bool {
        matches!(self, AspectVerdict::Mismatched { .. })
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AspectVerdict::Matched { .. } => "matched",
            AspectVerdict::Mismatched { .. } => "mismatched",
            AspectVerdict::Unknown => "unknown",
        }
    }
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decides whether a video's content aspect diverges from its frame aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectComparator {
    tolerance: f64,
}

impl AspectComparator {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    #[must_use]
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.aspect_tolerance)
    }

    pub fn compare(&self, frame: FrameSize, content: Option<&ContentBox>) -> AspectVerdict {
        let Some(content) = content else {
            return AspectVerdict::Unknown;
        };

        let original_aspect = round2(frame.aspect());
        if original_aspect <= 0.0 {
            log::warn!("Frame {} has no usable aspect ratio", frame);
            return AspectVerdict::Unknown;
        }
        let content_aspect = round2(content.aspect());

        if (content_aspect - original_aspect).abs() > self.tolerance + ROUNDING_SLACK {
            log::debug!(
                "Aspect mismatch: frame {} ({:.2}) vs content {}x{} ({:.2})",
                frame,
                original_aspect,
                content.width,
                content.height,
                content_aspect
            );
            AspectVerdict::Mismatched {
                original_aspect,
                content_aspect,
                margins: content.margins(),
            }
        } else {
            AspectVerdict::Matched { original_aspect }
        }
    }
}

impl Default for AspectComparator {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}
