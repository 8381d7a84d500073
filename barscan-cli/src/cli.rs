// barscan-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use barscan_core::BackendPreference;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Barscan: letterbox and pillarbox detector",
    long_about = "Detects black bars baked into video files and reports the content size, \
                  aspect ratios and margins of each video."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans video files (or directories of video files) for baked-in bars
    Scan(ScanArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Video files or directories containing video files
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    // --- Detection ---
    /// Colour fuzz in percent; pixels this close to the border colour count as bars
    #[arg(long, value_name = "PERCENT", default_value_t = config::DEFAULT_FUZZ_PERCENT)]
    pub fuzz: f64,

    /// Columns ignored on the left and right edge before detection
    #[arg(long, value_name = "PIXELS", default_value_t = 0)]
    pub pre_trim_x: u32,

    /// Rows ignored on the top and bottom edge before detection
    #[arg(long, value_name = "PIXELS", default_value_t = 0)]
    pub pre_trim_y: u32,

    /// Maximum aspect ratio difference still reported as unchanged
    #[arg(long, value_name = "RATIO", default_value_t = config::DEFAULT_ASPECT_TOLERANCE)]
    pub tolerance: f64,

    /// Detection backend: auto, scan (HandBrakeCLI) or sample (ffmpeg)
    #[arg(long, value_name = "BACKEND", default_value_t = BackendPreference::Auto)]
    pub backend: BackendPreference,

    // --- Sampling ---
    /// Time of the first sampled frame, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = config::DEFAULT_START_OFFSET_SECS)]
    pub start: f64,

    /// Time between sampled frames, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = config::DEFAULT_SAMPLE_INTERVAL_SECS)]
    pub interval: f64,

    /// Maximum number of frames sampled per video
    #[arg(long, value_name = "COUNT", default_value_t = config::DEFAULT_MAX_SAMPLES)]
    pub max_samples: usize,

    /// Optional: Number of videos analyzed in parallel (defaults to the CPU count)
    #[arg(short, long, value_name = "JOBS")]
    pub jobs: Option<usize>,

    /// Optional: Directory for temporary frame files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    // --- Output ---
    /// Emit one JSON object per video instead of text lines
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Optional: Directory for a run log file
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Parses the process arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
