// ============================================================================
// barscan-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates interactions with the external command-line tools
// barscan relies on (ffmpeg, ffprobe, HandBrakeCLI). Process execution goes
// through traits so the detection backends can be exercised with mocks.
//
// KEY COMPONENTS:
// - Traits for external tool interactions (FfmpegSpawner, FfprobeExecutor)
// - Concrete implementations using ffmpeg-sidecar and ffprobe crates
// - Dependency checking functions

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Mock executors for tests
#[cfg(test)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, FrameSchedule, SidecarProcess, SidecarSpawner, extract_frames,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, VideoProperties};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs the command with `version_arg` and only looks at whether it could be
/// started; the exit status is ignored because some tools return non-zero
/// for their version flag.
///
/// # Returns
///
/// * `Ok(())` - The command exists
/// * `Err(CoreError::DependencyNotFound)` - The command is not on the PATH
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Convenience wrapper returning only whether the command can be started.
#[must_use]
pub fn is_available(cmd_name: &str, version_arg: &str) -> bool {
    check_dependency(cmd_name, version_arg).is_ok()
}
