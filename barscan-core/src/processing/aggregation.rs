//! Bounding box aggregation across sampled frames.
//!
//! Every sampled frame contributes at most one [`CropRect`]. The aggregator
//! folds them into a single [`ContentBox`]: the widest and tallest content
//! seen, anchored at the smallest offsets seen. The result is the smallest
//! frame-anchored rectangle that would have contained the content of every
//! sample, so it never cuts into legitimate picture.
//!
//! The running state is an immutable [`CropAccumulator`] value. Folding is
//! commutative and associative, so partial accumulators built on different
//! threads can be merged in any order with identical results.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::CoreConfig;
use crate::processing::geometry::{ContentBox, CropRect, FrameSize, SampleCrop};

/// Running max/min state over accepted crop rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropAccumulator {
    max_width: u32,
    max_height: u32,
    min_x: u32,
    min_y: u32,
    count: usize,
}

impl Default for CropAccumulator {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            min_x: u32::MAX,
            min_y: u32::MAX,
            count: 0,
        }
    }
}

impl CropAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulator widened by one more rectangle.
    #[must_use]
    pub fn fold(self, rect: CropRect) -> Self {
        Self {
            max_width: self.max_width.max(rect.width),
            max_height: self.max_height.max(rect.height),
            min_x: self.min_x.min(rect.x),
            min_y: self.min_y.min(rect.y),
            count: self.count + 1,
        }
    }

    /// Combines two partial accumulators.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_width: self.max_width.max(other.max_width),
            max_height: self.max_height.max(other.max_height),
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            count: self.count + other.count,
        }
    }

    /// Number of rectangles folded in so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Resolves the accumulated state against the frame.
    ///
    /// Returns `None` when nothing was folded in. The offsets are kept; when
    /// the union would run past the right or bottom edge, width and height
    /// are cut back to end at that edge and the box is flagged as clamped.
    #[must_use]
    pub fn finish(&self, frame: FrameSize) -> Option<ContentBox> {
        if self.is_empty() {
            return None;
        }

        let x = self.min_x.min(frame.width);
        let y = self.min_y.min(frame.height);
        let width = self.max_width.min(frame.width - x);
        let height = self.max_height.min(frame.height - y);
        let clamped =
            (x, y, width, height) != (self.min_x, self.min_y, self.max_width, self.max_height);

        if clamped {
            log::warn!(
                "Aggregated content {}x{} at {},{} exceeds frame {}; clamped to {}x{}",
                self.max_width,
                self.max_height,
                self.min_x,
                self.min_y,
                frame,
                width,
                height
            );
        }

        Some(ContentBox {
            width,
            height,
            x,
            y,
            bottom: frame.height - y - height,
            right: frame.width - x - width,
            clamped,
        })
    }
}

/// Result of aggregating one video's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    /// Aggregated box, `None` when no sample produced usable content
    pub content: Option<ContentBox>,
    /// Samples received from the backend
    pub samples_seen: usize,
    /// Samples that contributed to the box
    pub samples_used: usize,
    /// Trailing samples left out of the box
    pub samples_discounted: usize,
}

/// Reduces a sequence of per-frame detections into one content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBoxAggregator {
    min_content_width: u32,
    trailing_discount: usize,
}

impl BoundingBoxAggregator {
    #[must_use]
    pub fn new(min_content_width: u32, trailing_discount: usize) -> Self {
        Self {
            min_content_width,
            trailing_discount,
        }
    }

    #[must_use]
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.min_content_width, config.trailing_discount)
    }

    /// How many trailing samples to drop out of `total`.
    ///
    /// Nothing is dropped below three samples, and at least two samples
    /// always remain.
    #[must_use]
    pub fn discount_for(&self, total: usize) -> usize {
        if total < 3 {
            0
        } else {
            self.trailing_discount.min(total - 2)
        }
    }

    /// Treats implausibly narrow content as a blank frame.
    #[must_use]
    pub fn accept(&self, sample: SampleCrop) -> Option<CropRect> {
        match sample {
            SampleCrop::Crop(rect) if rect.width >= self.min_content_width => Some(rect),
            SampleCrop::Crop(rect) => {
                log::debug!(
                    "Rejecting crop {} narrower than {}px as noise",
                    rect,
                    self.min_content_width
                );
                None
            }
            SampleCrop::NoCrop => None,
        }
    }

    /// Folds the samples in order, holding back the trailing ones until the
    /// total count is known.
    pub fn aggregate<I>(&self, frame: FrameSize, samples: I) -> Aggregation
    where
        I: IntoIterator<Item = SampleCrop>,
    {
        let mut held: VecDeque<SampleCrop> = VecDeque::with_capacity(self.trailing_discount + 1);
        let mut acc = CropAccumulator::new();
        let mut seen = 0usize;

        for sample in samples {
            seen += 1;
            log::trace!("Sample {}: {:?}", seen, sample);
            held.push_back(sample);
            if held.len() > self.trailing_discount {
                if let Some(oldest) = held.pop_front() {
                    acc = self.fold_sample(acc, oldest, frame);
                }
            }
        }

        let discounted = self.discount_for(seen);
        let keep = held.len().saturating_sub(discounted);
        for sample in held.drain(..).take(keep) {
            acc = self.fold_sample(acc, sample, frame);
        }

        if discounted > 0 {
            log::debug!("Discounted {} trailing sample(s) of {}", discounted, seen);
        }
        if acc.is_empty() {
            log::info!("No usable content found in {} sample(s)", seen);
        }

        Aggregation {
            content: acc.finish(frame),
            samples_seen: seen,
            samples_used: acc.count(),
            samples_discounted: discounted,
        }
    }

    fn fold_sample(
        &self,
        acc: CropAccumulator,
        sample: SampleCrop,
        frame: FrameSize,
    ) -> CropAccumulator {
        match self.accept(sample) {
            Some(rect) => {
                if !rect.fits_within(frame) {
                    log::debug!("Sample crop {} extends past frame {}", rect, frame);
                }
                acc.fold(rect)
            }
            None => acc,
        }
    }
}

impl Default for BoundingBoxAggregator {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameSize {
        FrameSize::new(1920, 1080).unwrap()
    }

    fn crop(width: u32, height: u32, x: u32, y: u32) -> SampleCrop {
        SampleCrop::Crop(CropRect::new(width, height, x, y))
    }

    #[test]
    fn test_union_of_boxes() {
        let aggregator = BoundingBoxAggregator::new(10, 0);
        let result = aggregator.aggregate(
            frame(),
            vec![crop(1800, 800, 60, 140), crop(1920, 700, 0, 190)],
        );
        let content = result.content.unwrap();
        assert_eq!((content.width, content.height, content.x, content.y), (1920, 800, 0, 140));
        assert_eq!(content.bottom, 140);
        assert_eq!(content.right, 0);
        assert!(!content.clamped);
        assert_eq!(result.samples_used, 2);
    }

    #[test]
    fn test_empty_and_blank_input_is_unknown() {
        let aggregator = BoundingBoxAggregator::default();
        let empty = aggregator.aggregate(frame(), Vec::new());
        assert_eq!(empty.content, None);
        assert_eq!(empty.samples_seen, 0);

        let blank = aggregator.aggregate(frame(), vec![SampleCrop::NoCrop; 6]);
        assert_eq!(blank.content, None);
        assert_eq!(blank.samples_seen, 6);
        assert_eq!(blank.samples_used, 0);
    }

    #[test]
    fn test_narrow_content_treated_as_no_crop() {
        let aggregator = BoundingBoxAggregator::new(10, 0);
        let noisy =
            aggregator.aggregate(frame(), vec![crop(1920, 800, 0, 140), crop(5, 1080, 0, 0)]);
        let clean =
            aggregator.aggregate(frame(), vec![crop(1920, 800, 0, 140), SampleCrop::NoCrop]);
        assert_eq!(noisy.content, clean.content);
        assert_eq!(noisy.samples_used, 1);
    }

    #[test]
    fn test_trailing_discount_counts() {
        let aggregator = BoundingBoxAggregator::new(10, 2);
        assert_eq!(aggregator.discount_for(0), 0);
        assert_eq!(aggregator.discount_for(1), 0);
        assert_eq!(aggregator.discount_for(2), 0);
        assert_eq!(aggregator.discount_for(3), 1);
        assert_eq!(aggregator.discount_for(4), 2);
        assert_eq!(aggregator.discount_for(10), 2);
    }

    #[test]
    fn test_trailing_samples_excluded() {
        let aggregator = BoundingBoxAggregator::new(10, 2);
        let mut samples = vec![crop(1920, 800, 0, 140); 4];
        samples.push(crop(1920, 1080, 0, 0));
        let result = aggregator.aggregate(frame(), samples);
        let content = result.content.unwrap();
        assert_eq!(content.height, 800);
        assert_eq!(result.samples_discounted, 2);
        assert_eq!(result.samples_used, 3);
    }

    #[test]
    fn test_two_samples_both_retained() {
        let aggregator = BoundingBoxAggregator::new(10, 2);
        let result =
            aggregator.aggregate(frame(), vec![crop(1920, 800, 0, 140), crop(1920, 1080, 0, 0)]);
        assert_eq!(result.samples_discounted, 0);
        assert_eq!(result.samples_used, 2);
        assert_eq!(result.content.unwrap().height, 1080);
    }

    #[test]
    fn test_overflowing_union_is_clamped() {
        let aggregator = BoundingBoxAggregator::new(10, 0);
        // Both rectangles hang off the bottom of the frame.
        let result = aggregator.aggregate(
            frame(),
            vec![crop(1920, 900, 0, 300), crop(1910, 900, 20, 250)],
        );
        let content = result.content.unwrap();
        assert!(content.clamped);
        assert_eq!((content.x, content.y), (0, 250));
        assert_eq!(content.height, 830);
        assert_eq!(content.bottom, 0);
        assert_eq!(content.right, 0);

        let wide = aggregator.aggregate(frame(), vec![crop(2000, 800, 0, 140)]);
        let content = wide.content.unwrap();
        assert!(content.clamped);
        assert_eq!(content.width, 1920);
        assert_eq!(content.right, 0);
    }

    #[test]
    fn test_clamped_box_stays_inside_frame() {
        let aggregator = BoundingBoxAggregator::new(10, 0);
        let result = aggregator.aggregate(
            frame(),
            vec![crop(1900, 800, 40, 140), crop(1880, 800, 60, 140)],
        );
        let content = result.content.unwrap();
        assert!(content.clamped);
        assert_eq!(content.x, 40);
        assert_eq!(content.width, 1880);
        assert!(content.x + content.width <= 1920);
        assert!(content.y + content.height <= 1080);
        assert_eq!(content.crop_filter(), "crop=1880:800:40:140");
    }

    #[test]
    fn test_merge_matches_sequential_fold() {
        let rects = [
            CropRect::new(1900, 800, 10, 140),
            CropRect::new(1920, 780, 0, 150),
            CropRect::new(1800, 810, 60, 135),
        ];
        let sequential = rects.iter().fold(CropAccumulator::new(), |acc, r| acc.fold(*r));
        let left = CropAccumulator::new().fold(rects[0]);
        let right = CropAccumulator::new().fold(rects[1]).fold(rects[2]);
        assert_eq!(left.merge(right), sequential);
        assert_eq!(right.merge(left), sequential);
        assert_eq!(sequential.count(), 3);
    }
}
