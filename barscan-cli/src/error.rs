// ============================================================================
// barscan-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// This module provides error handling utilities for the CLI that integrate
// with the barscan-core error types while adding CLI-specific error contexts.

use barscan_core::{CoreError, CoreResult};

use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            match core_error {
                // Keep the kinds that decide the exit path intact.
                CoreError::NoFilesFound | CoreError::Config(_) | CoreError::NoBackendAvailable => {
                    core_error
                }
                other => CoreError::OperationFailed(format!("{}: {}", f(), other)),
            }
        })
    }
}

/// Hint shown below a fatal error.
pub fn suggestion_for(error: &CoreError) -> Option<String> {
    match error {
        CoreError::NoBackendAvailable => {
            Some("Install HandBrakeCLI, or ffmpeg together with ffprobe".to_string())
        }
        CoreError::DependencyNotFound(tool) => Some(format!(
            "Make sure {tool} is installed and on your PATH, or use --backend auto"
        )),
        CoreError::Config(_) => {
            Some("Run `barscan scan --help` for the accepted values".to_string())
        }
        CoreError::NoFilesFound => Some(format!(
            "Supported extensions: {}",
            barscan_core::discovery::VIDEO_EXTENSIONS.join(", ")
        )),
        _ => None,
    }
}
