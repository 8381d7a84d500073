//! Main entry point for the Barscan CLI application.
//!
//! This handles command-line argument parsing, logging setup, and dispatching
//! to the command handlers. Fatal errors are reported once and turn into a
//! non-zero exit code; per-video failures do not.

use barscan::error::suggestion_for;
use barscan::logging::setup_logging;
use barscan::{Commands, parse_cli, run_scan};
use barscan_core::reporting::{JsonReporter, Reporter, ReporterError, TerminalReporter};

use std::process::ExitCode;

fn main() -> ExitCode {
    let cli_args = parse_cli();

    match cli_args.command {
        Commands::Scan(args) => {
            if let Err(e) = setup_logging(cli_args.verbose, args.log_dir.as_deref()) {
                eprintln!("{} {}", console::style("Error:").red().bold(), e);
                return ExitCode::FAILURE;
            }

            let reporter: Box<dyn Reporter> = if args.json {
                Box::new(JsonReporter::new())
            } else {
                Box::new(TerminalReporter::new())
            };

            match run_scan(args, reporter.as_ref()) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    log::info!("Scan aborted: {}", e);
                    let title = if e.is_fatal() {
                        "Cannot start scan"
                    } else {
                        "Scan aborted"
                    };
                    reporter.error(&ReporterError {
                        title: title.to_string(),
                        message: e.to_string(),
                        suggestion: suggestion_for(&e),
                    });
                    ExitCode::FAILURE
                }
            }
        }
    }
}
