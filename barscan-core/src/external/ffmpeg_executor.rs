// ============================================================================
// barscan-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes, and the frame rasterization step used by the multi-frame
// sampler.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - extract_frames: Rasterizes periodic frames of a video into a directory

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// File name pattern of rasterized frames inside the output directory.
pub const FRAME_FILE_PATTERN: &str = "frame_%04d.png";

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner: Send + Sync {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error(
                "ffmpeg (sidecar - get iter)",
                ExitStatus::default(),
                e.to_string(),
            )
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

// --- Frame Rasterization ---

/// Frame sampling schedule for [`extract_frames`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSchedule {
    pub start_offset_secs: f64,
    pub interval_secs: f64,
    pub max_frames: usize,
}

/// Builds the ffmpeg command rasterizing one frame every `interval_secs`.
pub fn build_frame_extraction_command(
    input_path: &Path,
    schedule: &FrameSchedule,
    output_dir: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();

    // Seek before the input so ffmpeg skips decoding the lead-in.
    cmd.args(["-ss", &format!("{:.2}", schedule.start_offset_secs)]);
    // Frames must keep the coded orientation ffprobe reports.
    cmd.arg("-noautorotate");
    cmd.input(input_path);
    cmd.args(["-an", "-sn"]);
    cmd.args(["-vf", &format!("fps=1/{}", schedule.interval_secs)]);
    cmd.args(["-frames:v", &schedule.max_frames.to_string()]);
    cmd.output(output_dir.join(FRAME_FILE_PATTERN));
    cmd
}

/// Rasterizes sampled frames of `input_path` as PNG files into `output_dir`.
///
/// Returns the frame paths in presentation order. An empty list means the
/// video produced no frames past the start offset.
pub fn extract_frames<S: FfmpegSpawner>(
    spawner: &S,
    input_path: &Path,
    schedule: &FrameSchedule,
    output_dir: &Path,
) -> CoreResult<Vec<PathBuf>> {
    log::debug!(
        "Extracting frames: input={}, start={:.2}, interval={}, max={}, out_dir={}",
        input_path.display(),
        schedule.start_offset_secs,
        schedule.interval_secs,
        schedule.max_frames,
        output_dir.display()
    );

    let cmd = build_frame_extraction_command(input_path, schedule, output_dir);
    log::trace!("Running frame extraction command: {:?}", cmd);

    let mut process = spawner.spawn(cmd)?;
    let mut error_lines = String::new();
    process.handle_events(|event| {
        if let FfmpegEvent::Error(line) = event {
            error_lines.push_str(&line);
            error_lines.push('\n');
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("Frame extraction failed for {}: {}", input_path.display(), status);
        return Err(command_failed_error(
            "ffmpeg (frame extraction)",
            status,
            error_lines,
        ));
    }

    let mut frames: Vec<PathBuf> = std::fs::read_dir(output_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            is_png.then_some(path)
        })
        .collect();
    frames.sort();

    log::debug!(
        "Extracted {} frame(s) from {}",
        frames.len(),
        input_path.display()
    );
    Ok(frames)
}
