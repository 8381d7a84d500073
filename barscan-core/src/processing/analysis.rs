//! Per-video analysis and batch orchestration.
//!
//! A video is analyzed by pulling its crop evidence from the selected
//! backend, folding it through the aggregator and comparing the result with
//! the frame. Backend failures become a `Failed` report for that video so a
//! batch always yields exactly one report per input, in input order.

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::CoreConfig;
use crate::detection::{BackendKind, CropBackend};
use crate::error::{CoreError, CoreResult};
use crate::processing::aggregation::BoundingBoxAggregator;
use crate::processing::aspect::{AspectComparator, AspectVerdict};
use crate::processing::geometry::{ContentBox, FrameSize, SampleCrop};

/// Aggregated evidence and verdict for one analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoAnalysis {
    pub frame: FrameSize,
    pub content: Option<ContentBox>,
    pub verdict: AspectVerdict,
    pub samples_seen: usize,
    pub samples_used: usize,
    pub samples_discounted: usize,
}

impl VideoAnalysis {
    /// Whether the content box had to be clamped to the frame.
    #[must_use]
    pub fn is_clamped(&self) -> bool {
        self.content.is_some_and(|c| c.clamped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VideoOutcome {
    Analyzed(VideoAnalysis),
    Failed { message: String },
}

/// Result of analyzing one input path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReport {
    pub path: PathBuf,
    pub backend: BackendKind,
    #[serde(flatten)]
    pub outcome: VideoOutcome,
}

impl VideoReport {
    /// File name used in report lines, falling back to the full path.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Counts of each outcome across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub unknown: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_reports(reports: &[VideoReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.total += 1;
            match &report.outcome {
                VideoOutcome::Failed { .. } => summary.failed += 1,
                VideoOutcome::Analyzed(analysis) => match analysis.verdict {
                    AspectVerdict::Matched { .. } => summary.matched += 1,
                    AspectVerdict::Mismatched { .. } => summary.mismatched += 1,
                    AspectVerdict::Unknown => summary.unknown += 1,
                },
            }
            summary
        })
    }
}

/// Aggregates a sample sequence and classifies the result.
pub fn evaluate_samples<I>(frame: FrameSize, samples: I, config: &CoreConfig) -> VideoAnalysis
where
    I: IntoIterator<Item = SampleCrop>,
{
    let aggregation = BoundingBoxAggregator::from_config(config).aggregate(frame, samples);
    let verdict =
        AspectComparator::from_config(config).compare(frame, aggregation.content.as_ref());

    VideoAnalysis {
        frame,
        content: aggregation.content,
        verdict,
        samples_seen: aggregation.samples_seen,
        samples_used: aggregation.samples_used,
        samples_discounted: aggregation.samples_discounted,
    }
}

/// Analyzes one video with the given backend.
///
/// Never fails: problems with the file or the backend are recorded in the
/// returned report.
pub fn analyze_video(backend: &dyn CropBackend, path: &Path, config: &CoreConfig) -> VideoReport {
    let outcome = match collect_and_evaluate(backend, path, config) {
        Ok(analysis) => {
            log::info!("{}: {}", path.display(), analysis.verdict.label());
            VideoOutcome::Analyzed(analysis)
        }
        Err(e) => {
            log::warn!("Analysis of {} failed: {}", path.display(), e);
            VideoOutcome::Failed {
                message: e.to_string(),
            }
        }
    };

    VideoReport {
        path: path.to_path_buf(),
        backend: backend.kind(),
        outcome,
    }
}

fn collect_and_evaluate(
    backend: &dyn CropBackend,
    path: &Path,
    config: &CoreConfig,
) -> CoreResult<VideoAnalysis> {
    if !path.is_file() {
        return Err(CoreError::PathError(format!(
            "No such file: {}",
            path.display()
        )));
    }
    let evidence = backend.collect(path)?;
    Ok(evaluate_samples(evidence.frame_size, evidence.samples, config))
}

/// Analyzes several videos in parallel.
///
/// Reports come back in the order of `inputs`. `on_done` is called from
/// worker threads as each video finishes, in completion order.
pub fn analyze_videos<F>(
    backend: &dyn CropBackend,
    inputs: &[PathBuf],
    config: &CoreConfig,
    on_done: F,
) -> CoreResult<Vec<VideoReport>>
where
    F: Fn(&VideoReport) + Sync,
{
    let jobs = config.effective_jobs().min(inputs.len()).max(1);
    log::debug!("Analyzing {} videos with {} workers", inputs.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize thread pool: {e}")))?;

    let reports: Vec<VideoReport> = pool.install(|| {
        inputs
            .par_iter()
            .map(|path| {
                let report = analyze_video(backend, path, config);
                on_done(&report);
                report
            })
            .collect()
    });
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::CropSamples;
    use crate::processing::geometry::CropRect;
    use std::sync::Mutex;

    /// Backend returning canned evidence keyed by file stem.
    struct CannedBackend;

    impl CropBackend for CannedBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::FrameSampler
        }

        fn collect(&self, input: &Path) -> CoreResult<CropSamples> {
            let frame = FrameSize::new(1920, 1080)?;
            let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
            let samples: Vec<SampleCrop> = match stem.as_str() {
                "scope" => vec![SampleCrop::Crop(CropRect::new(1920, 810, 0, 135)); 4],
                "full" => vec![SampleCrop::Crop(CropRect::new(1920, 1080, 0, 0)); 4],
                "blank" => vec![SampleCrop::NoCrop; 4],
                _ => return Err(CoreError::ScanParse(format!("unreadable {stem}"))),
            };
            Ok(CropSamples {
                frame_size: frame,
                samples: Box::new(samples.into_iter()),
            })
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_evaluate_scope_content() {
        let frame = FrameSize::new(1920, 1080).unwrap();
        let samples = vec![SampleCrop::Crop(CropRect::new(1920, 810, 0, 135)); 5];
        let analysis = evaluate_samples(frame, samples, &CoreConfig::default());

        assert!(analysis.verdict.is_mismatched());
        assert_eq!(analysis.samples_seen, 5);
        assert_eq!(analysis.samples_used, 3);
        assert_eq!(analysis.samples_discounted, 2);
        assert!(!analysis.is_clamped());
    }

    #[test]
    fn test_analyze_video_records_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "corrupt.mkv");
        let report = analyze_video(&CannedBackend, &path, &CoreConfig::default());

        assert_eq!(report.backend, BackendKind::FrameSampler);
        match report.outcome {
            VideoOutcome::Failed { message } => assert!(message.contains("unreadable corrupt")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_fails_without_backend_call() {
        let path = Path::new("/no/such/scope.mkv");
        let report = analyze_video(&CannedBackend, path, &CoreConfig::default());
        assert!(matches!(report.outcome, VideoOutcome::Failed { .. }));
        assert_eq!(report.display_name(), "scope.mkv");
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["full.mkv", "scope.mkv", "corrupt.mkv", "blank.mkv", "scope.mp4", "full.mp4"];
        let inputs: Vec<PathBuf> = names.iter().map(|n| touch(dir.path(), n)).collect();
        let config = CoreConfig {
            jobs: Some(4),
            ..CoreConfig::default()
        };

        let finished = Mutex::new(Vec::new());
        let reports = analyze_videos(&CannedBackend, &inputs, &config, |report| {
            finished.lock().unwrap().push(report.path.clone());
        })
        .unwrap();

        let paths: Vec<PathBuf> = reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, inputs);
        assert_eq!(finished.into_inner().unwrap().len(), inputs.len());

        let summary = BatchSummary::from_reports(&reports);
        assert_eq!(
            summary,
            BatchSummary {
                total: 6,
                matched: 2,
                mismatched: 2,
                unknown: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_empty_batch() {
        let reports = analyze_videos(&CannedBackend, &[], &CoreConfig::default(), |_| {}).unwrap();
        assert!(reports.is_empty());
        assert_eq!(BatchSummary::from_reports(&reports), BatchSummary::default());
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "scope.mkv");
        let report = analyze_video(&CannedBackend, &path, &CoreConfig::default());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "analyzed");
        assert_eq!(value["backend"], "frame-sampler");
        assert_eq!(value["verdict"]["verdict"], "mismatched");
        assert_eq!(value["content"]["height"], 810);
    }
}
