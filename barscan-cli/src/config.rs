// barscan-cli/src/config.rs
//
// Defines default configuration constants for the `barscan` application.
// Detection defaults come from barscan-core so the CLI and the library agree.

pub use barscan_core::config::{
    DEFAULT_ASPECT_TOLERANCE, DEFAULT_FUZZ_PERCENT, DEFAULT_MAX_SAMPLES,
    DEFAULT_SAMPLE_INTERVAL_SECS, DEFAULT_START_OFFSET_SECS,
};

/// File name prefix of run logs written to `--log-dir`.
pub const LOG_FILE_PREFIX: &str = "barscan_run";
