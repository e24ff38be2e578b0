//! Log sink configuration.
//!
//! Pipeline code reports through [`crate::events`]; this module only decides
//! where the resulting `log` records end up: the console (stderr, so JSON
//! event lines on stdout stay clean), `combined.log` with every record at the
//! chosen level, and `error.log` with errors only. Both files live directly in
//! the working directory.

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use std::path::{Path, PathBuf};

pub const COMBINED_LOG_FILE: &str = "combined.log";
pub const ERROR_LOG_FILE: &str = "error.log";

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S)} {h({l:<5})} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

/// Paths of the two log files kept under `work_dir`.
pub fn log_file_paths(work_dir: &Path) -> (PathBuf, PathBuf) {
    (work_dir.join(COMBINED_LOG_FILE), work_dir.join(ERROR_LOG_FILE))
}

/// Builds the log4rs configuration without installing it.
pub fn build_config(work_dir: &Path, level: LevelFilter) -> Result<Config> {
    std::fs::create_dir_all(work_dir)
        .with_context(|| format!("creating log directory {}", work_dir.display()))?;
    let (combined_path, error_path) = log_file_paths(work_dir);

    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let combined = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(&combined_path)
        .with_context(|| format!("opening {}", combined_path.display()))?;

    let errors = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(&error_path)
        .with_context(|| format!("opening {}", error_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .appender(Appender::builder().build("combined", Box::new(combined)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Error)))
                .build("errors", Box::new(errors)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("combined")
                .appender("errors")
                .build(level),
        )
        .context("building log4rs configuration")?;

    Ok(config)
}

/// Installs the global logger. Call once per process.
pub fn init_logging(work_dir: &Path, level: LevelFilter) -> Result<()> {
    let config = build_config(work_dir, level)?;
    log4rs::init_config(config).context("installing logger")?;
    log::debug!("Logging initialised at {} in {}", level, work_dir.display());
    Ok(())
}
