// ============================================================================
// barscan-core/src/detection/mod.rs
// ============================================================================
//
// DETECTION BACKENDS: Sources of Per-Frame Crop Evidence
//
// A backend turns a video file into the frame size plus a lazy sequence of
// per-sample crop detections. Two backends exist:
//
// - FrameSampler: rasterizes frames with ffmpeg and runs the fuzzy trim
//   detector on each of them.
// - AutocropScanner: asks HandBrakeCLI for its own autocrop estimate and
//   turns the reported margins into a single crop sample.
//
// Either way the evidence then flows through the same aggregator and
// comparator. Which backend is used is decided once per run by
// `select_backend`, based on the configured preference and tool
// availability, and the chosen backend is handed to the analysis code.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::{BackendPreference, CoreConfig};
use crate::error::{CoreError, CoreResult};
use crate::external::{self, CrateFfprobeExecutor, SidecarSpawner};
use crate::processing::geometry::{FrameSize, SampleCrop};

pub mod autocrop_scan;
pub mod frame_sampler;
pub mod fuzzy_trim;

pub use autocrop_scan::{AutocropScanner, ScanReport, parse_scan_output};
pub use frame_sampler::FrameSampler;
pub use fuzzy_trim::{FrameCropDetector, FuzzyTrimDetector};

/// Identifies the backend that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    AutocropScan,
    FrameSampler,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::AutocropScan => write!(f, "autocrop-scan"),
            BackendKind::FrameSampler => write!(f, "frame-sampler"),
        }
    }
}

/// Evidence collected for one video.
pub struct CropSamples {
    pub frame_size: FrameSize,
    /// Lazily produced detections, one per sample, in sampling order.
    pub samples: Box<dyn Iterator<Item = SampleCrop>>,
}

impl CropSamples {
    /// Evidence consisting of one already-aggregated sample.
    pub fn single(frame_size: FrameSize, sample: SampleCrop) -> Self {
        Self {
            frame_size,
            samples: Box::new(std::iter::once(sample)),
        }
    }
}

impl fmt::Debug for CropSamples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropSamples")
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}

/// A source of crop evidence for video files.
pub trait CropBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Collects crop evidence for `input`.
    ///
    /// Errors are per-video backend failures; they never abort a batch.
    fn collect(&self, input: &Path) -> CoreResult<CropSamples>;
}

const HANDBRAKE_CLI: &str = "HandBrakeCLI";

/// Picks the detection backend for this run.
///
/// `Auto` prefers the autocrop scanner, which reflects the tool's own
/// multi-frame analysis, and falls back to sampling frames with ffmpeg.
pub fn select_backend(config: &CoreConfig) -> CoreResult<Box<dyn CropBackend>> {
    select_backend_with(config, external::is_available)
}

/// Same as [`select_backend`], probing tools with `is_available(name, version_arg)`.
pub fn select_backend_with<F>(
    config: &CoreConfig,
    is_available: F,
) -> CoreResult<Box<dyn CropBackend>>
where
    F: Fn(&str, &str) -> bool,
{
    let require = |tool: &str, version_arg: &str| {
        if is_available(tool, version_arg) {
            Ok(())
        } else {
            Err(CoreError::DependencyNotFound(tool.to_string()))
        }
    };
    let scanner_available = || is_available(HANDBRAKE_CLI, "--version");
    let sampler_available =
        || is_available("ffmpeg", "-version") && is_available("ffprobe", "-version");

    let backend: Box<dyn CropBackend> = match config.backend {
        BackendPreference::Scan => {
            require(HANDBRAKE_CLI, "--version")?;
            Box::new(default_scanner(config))
        }
        BackendPreference::Sample => {
            require("ffmpeg", "-version")?;
            require("ffprobe", "-version")?;
            Box::new(default_sampler(config))
        }
        BackendPreference::Auto if scanner_available() => Box::new(default_scanner(config)),
        BackendPreference::Auto if sampler_available() => Box::new(default_sampler(config)),
        BackendPreference::Auto => return Err(CoreError::NoBackendAvailable),
    };

    log::info!("Using {} backend", backend.kind());
    Ok(backend)
}

fn default_scanner(config: &CoreConfig) -> AutocropScanner {
    AutocropScanner::new(HANDBRAKE_CLI).with_previews(config.max_samples)
}

fn default_sampler(config: &CoreConfig) -> FrameSampler<SidecarSpawner, CrateFfprobeExecutor> {
    FrameSampler::new(SidecarSpawner, CrateFfprobeExecutor, config)
}
