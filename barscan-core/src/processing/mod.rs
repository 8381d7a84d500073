//! Core letterbox analysis logic and orchestration.
//!
//! Geometry types are shared by every stage. The aggregator reduces per-frame
//! detections into one content box, the comparator classifies that box
//! against the frame, and `analysis` wires both to a detection backend for
//! single videos and batches.

/// Frame, crop and margin geometry
pub mod geometry;

/// Bounding box aggregation over sampled frames
pub mod aggregation;

/// Aspect ratio comparison
pub mod aspect;

/// Per-video and batch analysis
pub mod analysis;

pub use aggregation::{Aggregation, BoundingBoxAggregator, CropAccumulator};
pub use analysis::{
    BatchSummary, VideoAnalysis, VideoOutcome, VideoReport, analyze_video, analyze_videos,
    evaluate_samples,
};
pub use aspect::{AspectComparator, AspectVerdict, round2};
pub use geometry::{ContentBox, CropRect, EdgeMargins, FrameSize, SampleCrop};
