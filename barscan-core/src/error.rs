// ============================================================================
// barscan-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for barscan-core
//
// This module defines the error types used throughout the barscan-core
// library. Only I/O plumbing and configuration problems are errors: the
// aggregation and aspect comparison code never fails, it resolves empty or
// inconsistent input to well-defined sentinels instead.
//
// KEY COMPONENTS:
// - CoreError: Main error enum with variants for the different failure modes
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper functions for creating common error types

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Main error type for the barscan-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- I/O and Path Errors ----
    /// Error from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error related to path manipulation or validation.
    #[error("Path error: {0}")]
    PathError(String),

    // ---- External Command Errors ----
    /// Error when an external command fails to start.
    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, io::Error),

    /// Error when waiting for an external command to complete.
    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, io::Error),

    /// Error when an external command exits with a non-zero status.
    #[error("Command {0} failed with status {1}. Stderr: {2}")]
    CommandFailed(String, ExitStatus, String),

    /// Error when a required external tool is missing.
    #[error("Required dependency '{0}' not found. Please install it and ensure it's in your PATH.")]
    DependencyNotFound(String),

    /// No crop detection backend could be found on this system.
    #[error("No supported detection backend available (install HandBrakeCLI or ffmpeg/ffprobe)")]
    NoBackendAvailable,

    // ---- Media Analysis Errors ----
    /// Error parsing ffprobe output.
    #[error("ffprobe output parsing error: {0}")]
    FfprobeParse(String),

    /// Error retrieving or validating video dimensions.
    #[error("Failed to get video info: {0}")]
    VideoInfoError(String),

    /// Error parsing the autocrop report of a scanning tool.
    #[error("Scan output parsing error: {0}")]
    ScanParse(String),

    /// Error decoding a rasterized frame.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// A rasterized frame does not have the dimensions of the video.
    #[error("Frame {path} is {actual}, expected {expected}")]
    FrameSizeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // ---- Processing Errors ----
    /// No video files were found in the input directory.
    #[error("No processable video files found in the input directory")]
    NoFilesFound,

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Type alias for Result with CoreError as the error type.
pub type CoreResult<T> = Result<T, CoreError>;

/// Creates a CommandStart error.
pub fn command_start_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), error)
}

/// Creates a CommandWait error.
pub fn command_wait_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), error)
}

/// Creates a CommandFailed error.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(command.into(), status, stderr.into())
}

impl CoreError {
    /// Whether this error should abort the whole run rather than a single video.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::NoBackendAvailable | CoreError::DependencyNotFound(_) | CoreError::Config(_)
        )
    }
}
