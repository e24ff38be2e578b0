// ============================================================================
// recodec-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Helper Functions for Logging
//
// The log sinks themselves are configured by recodec_core::logging (log4rs,
// console plus combined.log and error.log in the working directory). This
// file holds the CLI-side helpers around it.
//
// AI-ASSISTANT-INFO: Timestamp and log level helpers for the CLI

use log::LevelFilter;

/// Returns the current UTC time as "YYYY-MM-DDTHH-MM-SS-mmmZ".
///
/// Colons are replaced so the value is safe inside a directory name.
///
/// # Example
/// ```
/// let name = format!("output-{}", recodec_cli::logging::get_timestamp());
/// assert!(name.ends_with('Z'));
/// ```
pub fn get_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Log level for the run: debug with `--verbose`, info otherwise.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
