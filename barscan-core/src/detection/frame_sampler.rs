//! Multi-frame sampler backend.
//!
//! Rasterizes one frame every sample interval, starting at the configured
//! offset, into a scoped temporary directory. Frames are decoded and run
//! through the fuzzy trim detector lazily as the aggregator pulls them; the
//! directory goes away together with the sample iterator.

use std::path::{Path, PathBuf};
use std::vec;

use tempfile::TempDir;

use crate::config::CoreConfig;
use crate::detection::fuzzy_trim::FuzzyTrimDetector;
use crate::detection::{BackendKind, CropBackend, CropSamples};
use crate::error::CoreResult;
use crate::external::{FfmpegSpawner, FfprobeExecutor, FrameSchedule, extract_frames};
use crate::processing::geometry::{FrameSize, SampleCrop};
use crate::temp_files;

/// Backend sampling frames with ffmpeg and detecting crops per frame.
pub struct FrameSampler<S, P> {
    spawner: S,
    prober: P,
    detector: FuzzyTrimDetector,
    start_offset_secs: f64,
    interval_secs: f64,
    max_samples: usize,
    temp_dir: Option<PathBuf>,
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> FrameSampler<S, P> {
    pub fn new(spawner: S, prober: P, config: &CoreConfig) -> Self {
        Self {
            spawner,
            prober,
            detector: FuzzyTrimDetector::from_config(config),
            start_offset_secs: config.start_offset_secs,
            interval_secs: config.sample_interval_secs,
            max_samples: config.max_samples,
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Sampling schedule for a video of the given duration.
    ///
    /// Videos shorter than the start offset are sampled from the beginning.
    fn schedule_for(&self, duration_secs: f64) -> FrameSchedule {
        let start_offset_secs = if duration_secs > self.start_offset_secs {
            self.start_offset_secs
        } else {
            0.0
        };
        FrameSchedule {
            start_offset_secs,
            interval_secs: self.interval_secs,
            max_frames: self.max_samples,
        }
    }
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> CropBackend for FrameSampler<S, P> {
    fn kind(&self) -> BackendKind {
        BackendKind::FrameSampler
    }

    fn collect(&self, input: &Path) -> CoreResult<CropSamples> {
        let props = self.prober.get_video_properties(input)?;
        let frame_size = FrameSize::new(props.width, props.height)?;
        let schedule = self.schedule_for(props.duration_secs);

        let dir = temp_files::create_temp_dir(self.temp_dir.as_deref(), "barscan_frames_")?;
        let frames = extract_frames(&self.spawner, input, &schedule, dir.path())?;
        if frames.is_empty() {
            log::warn!("No frames could be sampled from {}", input.display());
        }

        Ok(CropSamples {
            frame_size,
            samples: Box::new(FrameSamples {
                _dir: dir,
                frames: frames.into_iter(),
                frame_size,
                detector: self.detector,
            }),
        })
    }
}

/// Lazy per-frame detection over rasterized frames.
///
/// Owns the temporary directory so the frames outlive iteration. Frames
/// that cannot be decoded, or whose size differs from the probed frame size,
/// count as `NoCrop`.
struct FrameSamples {
    _dir: TempDir,
    frames: vec::IntoIter<PathBuf>,
    frame_size: FrameSize,
    detector: FuzzyTrimDetector,
}

impl Iterator for FrameSamples {
    type Item = SampleCrop;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.frames.next()?;
        let sample = self
            .detector
            .detect_file(&path, self.frame_size)
            .unwrap_or_else(|e| {
                log::warn!("Skipping unusable frame: {}", e);
                SampleCrop::NoCrop
            });
        log::debug!("{}: {:?}", path.display(), sample);
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}
