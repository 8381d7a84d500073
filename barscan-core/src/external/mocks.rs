// barscan-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Only compiled for unit tests.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::{FfprobeExecutor, VideoProperties};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use image::RgbImage;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    /// Frames written to the command's output pattern when it is spawned.
    pub frames: Vec<RgbImage>,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        frames: Vec<RgbImage>,
    ) {
        self.expectations
            .lock()
            .unwrap()
            .push(MockFfmpegExpectation {
                arg_pattern: arg_pattern.to_string(),
                result,
                frames,
            });
    }

    /// Expects a successful run that writes `frames` as PNG files.
    pub fn add_frames_expectation(&self, arg_pattern: &str, frames: Vec<RgbImage>) {
        let process = MockFfmpegProcess {
            events_to_emit: Vec::new(),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), frames);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), Vec::new());
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        // Raw wait status: the exit code lives in the high byte.
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: ExitStatus::from_raw(exit_code << 8),
        };
        self.add_expectation(arg_pattern, Ok(process), Vec::new());
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }
}

fn write_frames(output_pattern: &str, frames: &[RgbImage]) -> CoreResult<()> {
    for (index, frame) in frames.iter().enumerate() {
        let path = PathBuf::from(output_pattern.replace("%04d", &format!("{:04}", index + 1)));
        frame
            .save(&path)
            .map_err(|e| CoreError::ImageDecode(format!("mock frame {}: {e}", path.display())))?;
    }
    Ok(())
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.lock().unwrap().push(args.clone());

        let joined = args.join(" ");
        let mut expectations = self.expectations.lock().unwrap();
        let position = expectations
            .iter()
            .position(|exp| joined.contains(&exp.arg_pattern));

        match position {
            Some(index) => {
                let expectation = expectations.remove(index);
                if !expectation.frames.is_empty() {
                    if let Some(output) = args.last() {
                        write_frames(output, &expectation.frames)?;
                    }
                }
                expectation.result
            }
            None => {
                log::error!("MockFfmpegSpawner: unexpected command: {}", joined);
                Err(CoreError::OperationFailed(format!(
                    "Unexpected ffmpeg command: {joined}"
                )))
            }
        }
    }
}

/// Mock implementation of FfprobeExecutor returning fixed properties.
#[derive(Debug, Clone)]
pub struct MockFfprobeExecutor {
    properties: Option<VideoProperties>,
}

impl MockFfprobeExecutor {
    pub fn new(properties: VideoProperties) -> Self {
        Self {
            properties: Some(properties),
        }
    }

    /// Executor that fails as if the file had no video stream.
    pub fn failing() -> Self {
        Self { properties: None }
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        self.properties.clone().ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "No video stream found in {}",
                input_path.display()
            ))
        })
    }
}
