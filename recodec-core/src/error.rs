// ============================================================================
// recodec-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the recodec pipeline
//
// Each pipeline stage has its own variant so the orchestrator can decide which
// failures are terminal (enumeration, transcode under the default policy) and
// which are recovered locally (probe).
//
// AI-ASSISTANT-INFO: Error types and helper constructors for recodec-core

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the recodec core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A directory under the source root could not be read.
    #[error("Failed to enumerate '{}': {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The media prober could not parse a file.
    #[error("Probe failed for '{}': {message}", path.display())]
    Probe { path: PathBuf, message: String },

    /// The encoder failed or produced no readable output.
    #[error("Transcode failed for '{}': {message}", path.display())]
    Transcode { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{0}' failed with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The run was cancelled while an encode was in flight.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for recodec-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

pub(crate) fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub(crate) fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub(crate) fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

pub(crate) fn probe_error(path: &Path, message: impl Into<String>) -> CoreError {
    CoreError::Probe {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

pub(crate) fn transcode_error(path: &Path, message: impl Into<String>) -> CoreError {
    CoreError::Transcode {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
