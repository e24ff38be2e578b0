//! FFprobe integration for stream inspection.
//!
//! The production executor delegates to the `ffprobe` crate, which runs
//! `ffprobe -v quiet -show_format -show_streams -print_format json <path>`
//! and deserializes its output. Every failure mode (missing binary, non-zero
//! exit, unparseable output) is reported as [`CoreError::Probe`] for the
//! file in question. No retries are attempted.

use crate::error::{CoreResult, probe_error};
use crate::inspect::{StreamDescriptor, StreamKind};

use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for anything that can list the streams of a media file.
pub trait FfprobeExecutor {
    /// Returns one descriptor per stream, in container order.
    fn probe_streams(&self, input_path: &Path) -> CoreResult<Vec<StreamDescriptor>>;
}

/// Concrete implementation of `FfprobeExecutor` using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_streams(&self, input_path: &Path) -> CoreResult<Vec<StreamDescriptor>> {
        log::debug!(
            "Running ffprobe (via crate) for streams on: {}",
            input_path.display()
        );
        match ffprobe(input_path) {
            Ok(metadata) => Ok(metadata
                .streams
                .iter()
                .map(|s| StreamDescriptor {
                    index: s.index,
                    kind: StreamKind::from_codec_type(s.codec_type.as_deref()),
                    codec_name: s.codec_name.clone(),
                    codec_long_name: s.codec_long_name.clone(),
                })
                .collect()),
            Err(err) => {
                log::debug!("ffprobe failed on {}: {:?}", input_path.display(), err);
                Err(probe_error(input_path, describe_ffprobe_error(err)))
            }
        }
    }
}

fn describe_ffprobe_error(err: FfProbeError) -> String {
    match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                format!("ffprobe exited with {}", output.status)
            } else {
                format!("ffprobe exited with {}: {}", output.status, stderr)
            }
        }
        FfProbeError::Deserialize(err) => format!("unreadable ffprobe output: {err}"),
        #[allow(unreachable_patterns)]
        other => format!("unknown ffprobe error: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_probe_of_non_media_file_is_probe_error() {
        // Holds whether or not ffprobe is installed: a missing binary and an
        // unparseable file both surface as a probe failure for this path.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_video.mkv");
        std::fs::write(&path, b"plain text, not a container").unwrap();

        let result = CrateFfprobeExecutor::new().probe_streams(&path);
        match result {
            Err(CoreError::Probe { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected probe error, got {other:?}"),
        }
    }
}
