//! Frame and crop geometry shared by the aggregator and the comparator.
//!
//! All rectangles are expressed in the coordinate system of the original,
//! undecoded frame with the origin at the top-left corner.

use serde::Serialize;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Dimensions of the original frame. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Creates a frame size, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::VideoInfoError(format!(
                "Invalid frame dimensions {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Nominal aspect ratio of the frame.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rectangle of non-blank content detected within one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    #[must_use]
    pub fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self { width, height, x, y }
    }

    /// Whether the rectangle lies entirely inside the frame.
    #[must_use]
    pub fn fits_within(&self, frame: FrameSize) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(frame.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(frame.height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Outcome of running crop detection on one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCrop {
    /// Content was found within the frame.
    Crop(CropRect),
    /// The frame was blank or no content edge could be found.
    NoCrop,
}

impl From<Option<CropRect>> for SampleCrop {
    fn from(rect: Option<CropRect>) -> Self {
        rect.map_or(SampleCrop::NoCrop, SampleCrop::Crop)
    }
}

/// Distances from each outer edge of the frame to the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EdgeMargins {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl fmt::Display for EdgeMargins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top={} left={} bottom={} right={}",
            self.top, self.left, self.bottom, self.right
        )
    }
}

/// Aggregated content rectangle across all sampled frames of one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentBox {
    /// Widest detected content
    pub width: u32,
    /// Tallest detected content
    pub height: u32,
    /// Smallest horizontal offset
    pub x: u32,
    /// Smallest vertical offset
    pub y: u32,
    /// Distance from the bottom of the box to the bottom of the frame
    pub bottom: u32,
    /// Distance from the right of the box to the right of the frame
    pub right: u32,
    /// Set when the union exceeded the frame and margins were clamped to zero
    pub clamped: bool,
}

impl ContentBox {
    #[must_use]
    pub fn margins(&self) -> EdgeMargins {
        EdgeMargins {
            top: self.y,
            left: self.x,
            bottom: self.bottom,
            right: self.right,
        }
    }

    /// Content aspect ratio; zero when the box has no height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// ffmpeg `crop` filter expression for this box.
    #[must_use]
    pub fn crop_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_rejects_zero() {
        assert!(FrameSize::new(0, 1080).is_err());
        assert!(FrameSize::new(1920, 0).is_err());
        let frame = FrameSize::new(1920, 1080).unwrap();
        assert_eq!(frame.to_string(), "1920x1080");
        assert!((frame.aspect() - 1.7777).abs() < 0.001);
    }

    #[test]
    fn test_crop_rect_fits_within() {
        let frame = FrameSize::new(1920, 1080).unwrap();
        assert!(CropRect::new(1920, 800, 0, 140).fits_within(frame));
        assert!(!CropRect::new(1920, 800, 0, 300).fits_within(frame));
        assert!(!CropRect::new(1921, 1080, 0, 0).fits_within(frame));
    }

    #[test]
    fn test_content_box_margins_and_filter() {
        let content = ContentBox {
            width: 1920,
            height: 810,
            x: 0,
            y: 135,
            bottom: 135,
            right: 0,
            clamped: false,
        };
        let margins = content.margins();
        assert_eq!(
            margins,
            EdgeMargins {
                top: 135,
                left: 0,
                bottom: 135,
                right: 0,
            }
        );
        assert_eq!(margins.to_string(), "top=135 left=0 bottom=135 right=0");
        assert_eq!(content.crop_filter(), "crop=1920:810:0:135");
    }

    #[test]
    fn test_content_box_zero_height_aspect() {
        let content = ContentBox {
            width: 640,
            height: 0,
            x: 0,
            y: 0,
            bottom: 480,
            right: 0,
            clamped: false,
        };
        assert_eq!(content.aspect(), 0.0);
    }

    #[test]
    fn test_sample_crop_from_option() {
        let rect = CropRect::new(100, 50, 1, 2);
        assert_eq!(SampleCrop::from(Some(rect)), SampleCrop::Crop(rect));
        assert_eq!(SampleCrop::from(None), SampleCrop::NoCrop);
    }
}
