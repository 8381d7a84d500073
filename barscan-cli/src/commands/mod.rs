//! Command implementations for the CLI.

/// Module containing the implementation of the `scan` command.
/// This command analyzes videos for baked-in letterbox or pillarbox bars.
pub mod scan;
