// barscan-cli/src/commands/scan.rs
//
// Implementation of the `scan` command: builds the core configuration from
// the arguments, expands directories into video files, selects the
// detection backend once and reports one line per video in input order.

use barscan_core::reporting::Reporter;
use barscan_core::{
    BatchSummary, CoreConfig, CoreError, analyze_videos, find_video_files, select_backend,
};
use std::path::PathBuf;

use crate::cli::ScanArgs;
use crate::error::{CliErrorContext, CliResult};

/// Builds and validates the core configuration for a scan.
pub fn build_config(args: &ScanArgs) -> CliResult<CoreConfig> {
    let config = CoreConfig {
        fuzz_percent: args.fuzz,
        pre_trim_x: args.pre_trim_x,
        pre_trim_y: args.pre_trim_y,
        start_offset_secs: args.start,
        sample_interval_secs: args.interval,
        max_samples: args.max_samples,
        aspect_tolerance: args.tolerance,
        backend: args.backend,
        temp_dir: args.temp_dir.clone(),
        jobs: args.jobs,
        ..CoreConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Expands the command-line inputs into the list of videos to analyze.
///
/// Directories contribute their video files in sorted order. Any other path
/// is kept as given, so a missing file still gets its own failure line. A
/// directory without videos is only reported as a warning unless nothing at
/// all is left to analyze.
pub fn resolve_inputs(inputs: &[PathBuf], reporter: &dyn Reporter) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut empty_dirs = 0;
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        match find_video_files(input) {
            Ok(found) => {
                log::debug!("{} video(s) in {}", found.len(), input.display());
                files.extend(found);
            }
            Err(CoreError::NoFilesFound) => {
                empty_dirs += 1;
                reporter.warning(&format!("No video files in {}", input.display()));
            }
            Err(e) => {
                return Err(e)
                    .cli_with_context(|| format!("Scanning directory {}", input.display()));
            }
        }
    }

    if files.is_empty() && empty_dirs > 0 {
        return Err(CoreError::NoFilesFound);
    }
    Ok(files)
}

/// Runs the scan and reports every video through `reporter`.
///
/// Returns an error only for problems that stop the whole run; per-video
/// failures are part of the returned summary.
pub fn run_scan(args: ScanArgs, reporter: &dyn Reporter) -> CliResult<BatchSummary> {
    let config = build_config(&args)?;
    let files = resolve_inputs(&args.inputs, reporter)?;
    log::debug!("Effective configuration: {:?}", config);

    let backend = select_backend(&config)?;
    reporter.backend_selected(backend.kind());

    reporter.batch_started(files.len());
    let reports = analyze_videos(backend.as_ref(), &files, &config, |report| {
        reporter.video_finished(report);
    })?;

    for report in &reports {
        reporter.video_report(report);
    }

    let summary = BatchSummary::from_reports(&reports);
    log::info!(
        "Scanned {} video(s): {} mismatched, {} failed",
        summary.total,
        summary.mismatched,
        summary.failed
    );
    reporter.batch_complete(&summary);
    Ok(summary)
}
