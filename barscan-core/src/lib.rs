//! Core library for detecting letterbox and pillarbox bars baked into video files.
//!
//! This crate samples frames (or asks an external scanner), detects the
//! content rectangle of each sample, aggregates the samples into one content
//! box per video and compares the content aspect ratio with the frame's.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use barscan_core::{CoreConfig, analyze_videos, find_video_files, select_backend};
//! use barscan_core::reporting::format_report_line;
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! config.validate().unwrap();
//!
//! let files = find_video_files(Path::new("/path/to/videos")).unwrap();
//! let backend = select_backend(&config).unwrap();
//! let reports = analyze_videos(backend.as_ref(), &files, &config, |_| {}).unwrap();
//! for report in &reports {
//!     println!("{}", format_report_line(report));
//! }
//! ```

pub mod config;
pub mod detection;
pub mod discovery;
pub mod error;
pub mod external;
pub mod processing;
pub mod reporting;
pub mod temp_files;

// Re-exports for public API
pub use config::{BackendPreference, CoreConfig};
pub use detection::{BackendKind, CropBackend, CropSamples, select_backend, select_backend_with};
pub use discovery::find_video_files;
pub use error::{CoreError, CoreResult};
pub use processing::{
    AspectComparator, AspectVerdict, BatchSummary, BoundingBoxAggregator, ContentBox, CropRect,
    EdgeMargins, FrameSize, SampleCrop, VideoOutcome, VideoReport, analyze_video, analyze_videos,
    evaluate_samples,
};
pub use temp_files::create_temp_dir;
