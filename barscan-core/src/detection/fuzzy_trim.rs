//! Per-frame content detection by fuzzy-colour trimming.
//!
//! The colour of the top-left pixel (after the pre-trim margin is shaved off)
//! is taken as the background. Every pixel whose channels all stay within
//! the fuzz tolerance of that colour is background; the content rectangle is
//! the tightest box around everything else.

use image::{Rgb, RgbImage};
use std::path::Path;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::processing::geometry::{CropRect, FrameSize, SampleCrop};

/// Detects the content rectangle of one rasterized frame.
pub trait FrameCropDetector: Send + Sync {
    /// Returns the content rectangle in absolute frame coordinates, or
    /// `NoCrop` when the frame has no content edge.
    fn detect_crop(&self, frame: &RgbImage) -> SampleCrop;
}

/// Fuzzy-colour trim detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyTrimDetector {
    /// Colour slack in percent of full scale
    pub fuzz_percent: f64,
    /// Columns ignored on both the left and the right edge
    pub pre_trim_x: u32,
    /// Rows ignored on both the top and the bottom edge
    pub pre_trim_y: u32,
    /// Narrower content is reported as `NoCrop`
    pub min_content_width: u32,
}

impl FuzzyTrimDetector {
    #[must_use]
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            fuzz_percent: config.fuzz_percent,
            pre_trim_x: config.pre_trim_x,
            pre_trim_y: config.pre_trim_y,
            min_content_width: config.min_content_width,
        }
    }

    /// Largest per-channel difference still counted as background.
    fn channel_slack(&self) -> u8 {
        (self.fuzz_percent.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8
    }

    /// Decodes the image at `path` and runs detection on it.
    ///
    /// The decoded image must be exactly `frame_size`, otherwise its
    /// rectangle would not be in the video's coordinate system.
    pub fn detect_file(&self, path: &Path, frame_size: FrameSize) -> CoreResult<SampleCrop> {
        let frame = image::open(path)
            .map_err(|e| CoreError::ImageDecode(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (width, height) = frame.dimensions();
        if (width, height) != (frame_size.width, frame_size.height) {
            return Err(CoreError::FrameSizeMismatch {
                path: path.display().to_string(),
                expected: frame_size.to_string(),
                actual: format!("{width}x{height}"),
            });
        }
        Ok(self.detect_crop(&frame))
    }
}

impl Default for FuzzyTrimDetector {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

fn is_background(pixel: &Rgb<u8>, background: &Rgb<u8>, slack: u8) -> bool {
    pixel
        .0
        .iter()
        .zip(background.0.iter())
        .all(|(p, b)| p.abs_diff(*b) <= slack)
}

impl FrameCropDetector for FuzzyTrimDetector {
    fn detect_crop(&self, frame: &RgbImage) -> SampleCrop {
        let (width, height) = frame.dimensions();
        let (shave_x, shave_y) = (self.pre_trim_x, self.pre_trim_y);
        if width <= shave_x.saturating_mul(2) || height <= shave_y.saturating_mul(2) {
            log::debug!(
                "Frame {}x{} is smaller than the pre-trim margin {}x{}",
                width,
                height,
                shave_x,
                shave_y
            );
            return SampleCrop::NoCrop;
        }

        let (x_end, y_end) = (width - shave_x, height - shave_y);
        let background = *frame.get_pixel(shave_x, shave_y);
        let slack = self.channel_slack();

        let mut left = u32::MAX;
        let mut top = u32::MAX;
        let mut right = 0;
        let mut bottom = 0;
        let mut found = false;

        for y in shave_y..y_end {
            for x in shave_x..x_end {
                if !is_background(frame.get_pixel(x, y), &background, slack) {
                    found = true;
                    left = left.min(x);
                    right = right.max(x);
                    top = top.min(y);
                    bottom = bottom.max(y);
                }
            }
        }

        if !found {
            log::debug!("No content edge found in {}x{} frame", width, height);
            return SampleCrop::NoCrop;
        }

        // Coordinates were taken in the full frame, so the shaved margin is
        // already part of the offsets.
        let rect = CropRect::new(right - left + 1, bottom - top + 1, left, top);
        if rect.width < self.min_content_width {
            log::debug!("Detected content {} is implausibly narrow", rect);
            return SampleCrop::NoCrop;
        }
        SampleCrop::Crop(rect)
    }
}
