// ============================================================================
// recodec-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools and File System
//
// This module encapsulates interactions with ffprobe and ffmpeg, as well as
// file size lookups. Each collaborator sits behind a trait so the pipeline can
// run against the real tools in production and against the mocks in tests.
//
// KEY COMPONENTS:
// - FfprobeExecutor: stream inspection (CrateFfprobeExecutor via the ffprobe crate)
// - FfmpegSpawner / FfmpegProcess: encoder processes (SidecarSpawner via ffmpeg-sidecar)
// - FileMetadataProvider: file size access (StdFsMetadataProvider)
// - check_dependency: presence check for the external binaries
//
// Commands are always built as argument vectors, never as shell strings.
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Test doubles for the external tool traits
#[cfg(unix)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded. Only a missing binary or
/// a failure to start is reported; the exit status itself is not inspected.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Trait for abstracting file metadata access operations.
///
/// # Examples
///
/// ```rust
/// use recodec_core::external::FileMetadataProvider;
/// use recodec_core::CoreResult;
/// use std::path::Path;
///
/// struct FixedSize;
///
/// impl FileMetadataProvider for FixedSize {
///     fn get_size(&self, _path: &Path) -> CoreResult<u64> {
///         Ok(1_000_000)
///     }
/// }
///
/// assert_eq!(FixedSize.get_size(Path::new("/fake/path")).unwrap(), 1_000_000);
/// ```
pub trait FileMetadataProvider {
    /// Gets the size of the file at the given path in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// Standard implementation of FileMetadataProvider using `std::fs::metadata`.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}
