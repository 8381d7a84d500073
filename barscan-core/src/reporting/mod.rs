//! Output of analysis results.
//!
//! Every run talks to one `Reporter`. The terminal reporter shows a progress
//! bar while videos are analyzed and then prints one line per video in input
//! order; the JSON reporter emits one object per line for machine consumers.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::detection::BackendKind;
use crate::processing::analysis::{BatchSummary, VideoOutcome, VideoReport};
use crate::processing::aspect::AspectVerdict;

/// High-level warning/error message.
#[derive(Clone, Debug)]
pub struct ReporterError {
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn backend_selected(&self, _kind: BackendKind) {}
    fn batch_started(&self, _total_files: usize) {}
    /// Called from worker threads as each video finishes.
    fn video_finished(&self, _report: &VideoReport) {}
    /// Called once per video, in input order, after the batch finished.
    fn video_report(&self, _report: &VideoReport) {}
    fn batch_complete(&self, _summary: &BatchSummary) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _error: &ReporterError) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Formats the single result line for one video.
#[must_use]
pub fn format_report_line(report: &VideoReport) -> String {
    let name = report.display_name();
    let analysis = match &report.outcome {
        VideoOutcome::Failed { message } => return format!("{name}: failed: {message}"),
        VideoOutcome::Analyzed(analysis) => analysis,
    };

    let frame = analysis.frame;
    let mut line = match (&analysis.verdict, analysis.content) {
        (
            AspectVerdict::Mismatched {
                original_aspect,
                content_aspect,
                margins,
            },
            Some(content),
        ) => format!(
            "{name}: {frame} -> {}x{} (aspect {original_aspect:.2} -> {content_aspect:.2}) margins {margins} {}",
            content.width,
            content.height,
            content.crop_filter()
        ),
        (AspectVerdict::Matched { original_aspect }, _) => {
            format!("{name}: {frame} unchanged (aspect {original_aspect:.2})")
        }
        _ => format!("{name}: {frame} unknown (no usable frames)"),
    };

    if analysis.is_clamped() {
        line.push_str(" [clamped]");
    }
    line
}

/// Formats the closing line of a batch.
#[must_use]
pub fn format_summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} video{}: {} matched, {} mismatched, {} unknown, {} failed",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        summary.matched,
        summary.mismatched,
        summary.unknown,
        summary.failed
    )
}

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    progress: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            progress: Mutex::new(None),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn write_line(&self, line: impl std::fmt::Display) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn backend_selected(&self, kind: BackendKind) {
        log::info!("Detecting bars with the {} backend", kind);
    }

    fn batch_started(&self, total_files: usize) {
        self.finish_progress();
        if total_files < 2 {
            return;
        }
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(progress_style) =
            ProgressStyle::default_bar().template("Scanning [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(progress_style.progress_chars("=> "));
        }
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn video_finished(&self, report: &VideoReport) {
        if let Ok(guard) = self.progress.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(report.display_name());
                pb.inc(1);
            }
        }
    }

    fn video_report(&self, report: &VideoReport) {
        self.finish_progress();
        let line = format_report_line(report);
        match &report.outcome {
            VideoOutcome::Failed { .. } => self.write_line(style(line).red()),
            VideoOutcome::Analyzed(analysis) => match analysis.verdict {
                AspectVerdict::Mismatched { .. } => self.write_line(style(line).yellow().bold()),
                AspectVerdict::Matched { .. } => self.write_line(line),
                AspectVerdict::Unknown => self.write_line(style(line).dim()),
            },
        }
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        self.finish_progress();
        if summary.total > 1 {
            self.write_line(style(format_summary_line(summary)).bold());
        }
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", style(format!("WARN: {}", message)).yellow().bold());
    }

    fn error(&self, error: &ReporterError) {
        self.finish_progress();
        eprintln!(
            "{} {}",
            style("ERROR").red().bold(),
            style(&error.title).red().bold()
        );
        eprintln!("  {}", error.message);
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  Suggestion: {}", suggestion);
        }
    }
}

/// Reporter writing one JSON object per line.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn video_report(&self, report: &VideoReport) {
        let mut value = match serde_json::to_value(report) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to serialize report for {}: {}", report.path.display(), e);
                return;
            }
        };
        if let Some(object) = value.as_object_mut() {
            object.insert("type".to_string(), json!("video"));
            object.insert("timestamp".to_string(), json!(Self::timestamp()));
        }
        self.write_value(value);
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        let value = json!({
            "type": "batch_complete",
            "total": summary.total,
            "matched": summary.matched,
            "mismatched": summary.mismatched,
            "unknown": summary.unknown,
            "failed": summary.failed,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn warning(&self, message: &str) {
        let value = json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn error(&self, error: &ReporterError) {
        let value = json!({
            "type": "error",
            "title": error.title,
            "message": error.message,
            "suggestion": error.suggestion,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }
}
