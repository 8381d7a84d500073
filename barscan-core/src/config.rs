// ============================================================================
// barscan-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration used by the barscan-core library:
// the frame sampling schedule, the fuzzy trim parameters handed to the
// per-frame detector, the aggregation policy and the aspect tolerance.
//
// USAGE:
// Instances of CoreConfig are created by consumers of the library (like
// barscan-cli), validated once, and passed to backend selection and to the
// analysis entry points.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default colour fuzz, in percent of full scale, used by the fuzzy trim.
pub const DEFAULT_FUZZ_PERCENT: f64 = 10.0;

/// Default time offset of the first sampled frame.
/// Skips studio logos and fades at the very start of most videos.
pub const DEFAULT_START_OFFSET_SECS: f64 = 60.0;

/// Default spacing between sampled frames.
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 60.0;

/// Default upper bound on the number of sampled frames per video.
pub const DEFAULT_MAX_SAMPLES: usize = 10;

/// Detected content narrower than this is treated as noise.
pub const DEFAULT_MIN_CONTENT_WIDTH: u32 = 10;

/// Number of trailing samples discounted from aggregation.
pub const DEFAULT_TRAILING_DISCOUNT: usize = 2;

/// Aspect ratios further apart than this (after rounding) are a mismatch.
pub const DEFAULT_ASPECT_TOLERANCE: f64 = 0.01;

// ============================================================================
// BACKEND PREFERENCE
// ============================================================================

/// Which detection backend the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Prefer the autocrop scanner, fall back to the frame sampler.
    #[default]
    Auto,
    /// Only use the single-report autocrop scanner.
    Scan,
    /// Only use the multi-frame sampler.
    Sample,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPreference::Auto => write!(f, "auto"),
            BackendPreference::Scan => write!(f, "scan"),
            BackendPreference::Sample => write!(f, "sample"),
        }
    }
}

impl FromStr for BackendPreference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "scan" => Ok(BackendPreference::Scan),
            "sample" => Ok(BackendPreference::Sample),
            other => Err(CoreError::Config(format!(
                "Unknown backend '{other}' (expected auto, scan or sample)"
            ))),
        }
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the barscan-core library.
///
/// # Examples
///
/// ```rust
/// use barscan_core::CoreConfig;
///
/// let config = CoreConfig {
///     fuzz_percent: 15.0,
///     max_samples: 20,
///     ..CoreConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CoreConfig {
    // ---- Per-frame detection ----
    /// Colour slack, in percent, for treating a pixel as background
    pub fuzz_percent: f64,

    /// Columns ignored at the left and right edge before trimming
    pub pre_trim_x: u32,

    /// Rows ignored at the top and bottom edge before trimming
    pub pre_trim_y: u32,

    // ---- Frame sampling ----
    /// Time of the first sampled frame
    pub start_offset_secs: f64,

    /// Time between sampled frames
    pub sample_interval_secs: f64,

    /// Upper bound on sampled frames per video
    pub max_samples: usize,

    // ---- Aggregation and comparison ----
    /// Minimum plausible width of detected content
    pub min_content_width: u32,

    /// Trailing samples excluded from the bounding box
    pub trailing_discount: usize,

    /// Allowed difference between rounded aspect ratios
    pub aspect_tolerance: f64,

    // ---- Runtime ----
    /// Requested detection backend
    pub backend: BackendPreference,

    /// Base directory for rasterized frames (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// Number of videos analyzed concurrently (logical CPUs when unset)
    pub jobs: Option<usize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            fuzz_percent: DEFAULT_FUZZ_PERCENT,
            pre_trim_x: 0,
            pre_trim_y: 0,
            start_offset_secs: DEFAULT_START_OFFSET_SECS,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            max_samples: DEFAULT_MAX_SAMPLES,
            min_content_width: DEFAULT_MIN_CONTENT_WIDTH,
            trailing_discount: DEFAULT_TRAILING_DISCOUNT,
            aspect_tolerance: DEFAULT_ASPECT_TOLERANCE,
            backend: BackendPreference::Auto,
            temp_dir: None,
            jobs: None,
        }
    }
}

impl CoreConfig {
    /// Checks that every value is within its usable range.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=100.0).contains(&self.fuzz_percent) {
            return Err(CoreError::Config(format!(
                "fuzz must be between 0 and 100 percent, got {}",
                self.fuzz_percent
            )));
        }
        if !self.start_offset_secs.is_finite() || self.start_offset_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "start offset must be a non-negative number of seconds, got {}",
                self.start_offset_secs
            )));
        }
        if !self.sample_interval_secs.is_finite() || self.sample_interval_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "sample interval must be positive, got {}",
                self.sample_interval_secs
            )));
        }
        if self.max_samples == 0 {
            return Err(CoreError::Config(
                "at least one sample per video is required".to_string(),
            ));
        }
        if !self.aspect_tolerance.is_finite() || self.aspect_tolerance < 0.0 {
            return Err(CoreError::Config(format!(
                "aspect tolerance must be non-negative, got {}",
                self.aspect_tolerance
            )));
        }
        if self.jobs == Some(0) {
            return Err(CoreError::Config("jobs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of worker threads for batch analysis.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}
