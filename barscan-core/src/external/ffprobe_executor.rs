//! FFprobe integration for video property extraction.
//!
//! The frame sampler needs the frame dimensions (the aspect ratio the content
//! is compared against) and the duration (to keep the first sample inside the
//! video). Both come from the `ffprobe` crate.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Video metadata relevant to crop analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProperties {
    /// Width of the video in pixels
    pub width: u32,

    /// Height of the video in pixels
    pub height: u32,

    /// Duration of the video in seconds
    pub duration_secs: f64,
}

/// Source of video properties.
pub trait FfprobeExecutor: Send + Sync {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties>;
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        get_video_properties(input_path)
    }
}

/// Gets video properties for a given input file.
pub fn get_video_properties(input_path: &Path) -> CoreResult<VideoProperties> {
    log::debug!(
        "Running ffprobe (via crate) for video properties on: {}",
        input_path.display()
    );
    match ffprobe(input_path) {
        Ok(metadata) => {
            let video_stream = metadata
                .streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
                .ok_or_else(|| {
                    CoreError::VideoInfoError(format!(
                        "No video stream found in {}",
                        input_path.display()
                    ))
                })?;

            let (width, height) = match (video_stream.width, video_stream.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
                (w, h) => {
                    return Err(CoreError::VideoInfoError(format!(
                        "Video stream in {} has unusable dimensions: width={:?}, height={:?}",
                        input_path.display(),
                        w,
                        h
                    )));
                }
            };

            // Some containers only carry a per-stream duration.
            let duration_secs = metadata
                .format
                .duration
                .as_deref()
                .or(video_stream.duration.as_deref())
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or_else(|| {
                    log::warn!(
                        "No duration reported for {}, sampling from the start",
                        input_path.display()
                    );
                    0.0
                });

            Ok(VideoProperties {
                width,
                height,
                duration_secs,
            })
        }
        Err(err) => {
            log::error!(
                "ffprobe failed for video properties on {}: {:?}",
                input_path.display(),
                err
            );
            Err(map_ffprobe_error(err, "video properties"))
        }
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
