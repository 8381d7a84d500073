// ============================================================================
// barscan-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch for console and optional file output
//
// Library code logs through the `log` facade only. The CLI installs a single
// fern dispatcher: warnings and above (everything with --verbose) go to
// stderr so stdout stays reserved for report lines, and the full configured
// level goes to `barscan_run_<timestamp>.log` when a log directory is given.

use log::LevelFilter;
use std::path::{Path, PathBuf};

use crate::config::LOG_FILE_PREFIX;
use crate::error::{CliErrorContext, CliResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("barscan_run_{}.log", barscan::logging::get_timestamp());
/// assert!(log_filename.starts_with("barscan_run_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the run log inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, get_timestamp()))
}

/// Log level selected by the verbose flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Returns the log file path, if any.
pub fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);
    let console_level = if verbose { level } else { LevelFilter::Warn };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {}",
                console::style(format!("[{}]", record.level())).dim(),
                message
            ))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // Third-party crates stay quiet unless something is wrong.
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .cli_with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = log_file_path(dir);
            let file = fern::log_file(&path)
                .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "{} [{}] {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            message
                        ))
                    })
                    .chain(file),
            );
            Some(path)
        }
        None => None,
    };

    dispatch.apply().map_err(|e| {
        barscan_core::CoreError::OperationFailed(format!("Failed to initialize logging: {e}"))
    })?;

    if let Some(path) = &log_path {
        log::info!("Logging to {}", path.display());
    }
    if verbose {
        log::debug!("Debug level logging enabled");
    }
    Ok(log_path)
}
