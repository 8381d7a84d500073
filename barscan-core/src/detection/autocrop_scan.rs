//! Single-report autocrop scanner backend.
//!
//! HandBrakeCLI analyses a set of preview frames during `--scan` and prints
//! the frame size and its own autocrop estimate as top/bottom/left/right
//! margins. The report is parsed into typed values and converted into one
//! synthetic crop sample so it can go through the regular aggregator.

use regex::Regex;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use crate::detection::{BackendKind, CropBackend, CropSamples};
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::processing::geometry::{CropRect, EdgeMargins, FrameSize, SampleCrop};

/// Default number of preview frames HandBrakeCLI analyses.
pub const DEFAULT_SCAN_PREVIEWS: usize = 10;

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+\s*size:\s*(\d+)x(\d+)").expect("valid size regex"));

static AUTOCROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\s*autocrop:\s*(\d+)/(\d+)/(\d+)/(\d+)").expect("valid autocrop regex")
});

/// Frame size and autocrop margins reported by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub frame_size: FrameSize,
    pub margins: EdgeMargins,
}

impl ScanReport {
    /// Converts the reported margins into a crop sample in frame coordinates.
    #[must_use]
    pub fn to_sample(&self) -> SampleCrop {
        let EdgeMargins { top, left, bottom, right } = self.margins;
        let FrameSize { width, height } = self.frame_size;

        let horizontal = u64::from(left) + u64::from(right);
        let vertical = u64::from(top) + u64::from(bottom);
        if horizontal >= u64::from(width) || vertical >= u64::from(height) {
            log::warn!(
                "Autocrop margins {} leave no picture in {}",
                self.margins,
                self.frame_size
            );
            return SampleCrop::NoCrop;
        }

        SampleCrop::Crop(CropRect::new(
            width - left - right,
            height - top - bottom,
            left,
            top,
        ))
    }
}

/// Parses the `size` and `autocrop` lines of a HandBrakeCLI scan.
///
/// Only the first title is considered.
pub fn parse_scan_output(output: &str) -> CoreResult<ScanReport> {
    let size = SIZE_RE
        .captures(output)
        .ok_or_else(|| CoreError::ScanParse("no frame size in scan output".to_string()))?;
    let width = parse_number(&size[1], "width")?;
    let height = parse_number(&size[2], "height")?;
    let frame_size = FrameSize::new(width, height)?;

    let crop = AUTOCROP_RE
        .captures(output)
        .ok_or_else(|| CoreError::ScanParse("no autocrop report in scan output".to_string()))?;
    let margins = EdgeMargins {
        top: parse_number(&crop[1], "top margin")?,
        bottom: parse_number(&crop[2], "bottom margin")?,
        left: parse_number(&crop[3], "left margin")?,
        right: parse_number(&crop[4], "right margin")?,
    };

    Ok(ScanReport { frame_size, margins })
}

fn parse_number(text: &str, what: &str) -> CoreResult<u32> {
    text.parse::<u32>()
        .map_err(|e| CoreError::ScanParse(format!("invalid {what} '{text}': {e}")))
}

/// Backend delegating crop analysis to HandBrakeCLI's scan.
#[derive(Debug, Clone)]
pub struct AutocropScanner {
    program: String,
    previews: usize,
}

impl AutocropScanner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            previews: DEFAULT_SCAN_PREVIEWS,
        }
    }

    #[must_use]
    pub fn with_previews(mut self, previews: usize) -> Self {
        self.previews = previews.max(1);
        self
    }

    fn run_scan(&self, input: &Path) -> CoreResult<String> {
        log::debug!("Running {} scan on {}", self.program, input.display());
        let output = Command::new(&self.program)
            .arg("--scan")
            .args(["--title", "1"])
            .args(["--previews", &format!("{}:0", self.previews)])
            .arg("--input")
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| command_start_error(self.program.as_str(), e))?;

        // HandBrakeCLI prints scan information on stderr.
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            log::error!("{} scan failed on {}: {}", self.program, input.display(), output.status);
            return Err(command_failed_error(self.program.as_str(), output.status, stderr));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&stderr);
        log::trace!("{} scan output for {}: {}", self.program, input.display(), text);
        Ok(text)
    }
}

impl CropBackend for AutocropScanner {
    fn kind(&self) -> BackendKind {
        BackendKind::AutocropScan
    }

    fn collect(&self, input: &Path) -> CoreResult<CropSamples> {
        let report = parse_scan_output(&self.run_scan(input)?)?;
        log::debug!(
            "Autocrop for {}: frame {} margins {}",
            input.display(),
            report.frame_size,
            report.margins
        );
        Ok(CropSamples::single(report.frame_size, report.to_sample()))
    }
}
