//! Command implementations for the CLI.

/// A full pipeline run, or a dry run that only lists the selected files.
pub mod run;
