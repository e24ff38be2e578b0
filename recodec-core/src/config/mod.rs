//! Configuration structures and constants for the recodec-core library.
//!
//! This module provides the configuration for a pipeline run: the source and
//! output roots, the recognised extensions and modern codecs, the encode
//! profile, and the two policy switches that decide how duplicate selections
//! and transcode failures are handled.

mod builder;

use crate::discovery::ExtensionSet;
use crate::error::{CoreError, CoreResult};
use crate::inspect::DEFAULT_MODERN_CODECS;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default ffmpeg video encoder.
pub const DEFAULT_VIDEO_CODEC: &str = "libx265";

/// Default CRF (Constant Rate Factor) quality value for the encoder.
/// Lower values produce higher quality but larger files.
/// Range: 0-51 for libx264/libx265.
pub const DEFAULT_CRF: u8 = 28;

/// Highest CRF accepted by the x264/x265 encoders.
pub const MAX_CRF: u8 = 51;

/// Default container extension of the encoded output.
pub const DEFAULT_TARGET_EXTENSION: &str = "mp4";

/// Containers in which HEVC video is tagged `hvc1`.
const HVC1_CONTAINERS: [&str; 3] = ["mp4", "mov", "m4v"];

/// How often a file with several legacy video streams is handed to the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamSelectionPolicy {
    /// Select each file at most once, however many legacy video streams it has.
    #[default]
    OncePerFile,
    /// Select the file once per legacy video stream.
    OncePerStream,
}

/// What the pipeline does when a single file fails to transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscodeFailurePolicy {
    /// Stop the run at the first failed transcode.
    #[default]
    Abort,
    /// Log the failure, record it in the summary and continue with the next file.
    Skip,
}

/// Fixed encoder settings applied to every transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeProfile {
    /// ffmpeg video encoder name (e.g. `libx265`, `libsvtav1`)
    pub video_codec: String,

    /// CRF quality value passed as `-crf`
    pub crf: u8,

    /// Encoder preset passed as `-preset`; the encoder's own default when unset.
    /// Preset names are encoder specific (`slow` for x265, `8` for SVT-AV1).
    pub preset: Option<String>,

    /// Extension (container) of the encoded output, without dot
    pub target_extension: String,
}

impl EncodeProfile {
    /// Whether the encoder produces HEVC (`libx265`, `hevc_nvenc`, ...).
    #[must_use]
    pub fn is_hevc_encoder(&self) -> bool {
        let codec = self.video_codec.trim().to_ascii_lowercase();
        codec == "libx265" || codec.starts_with("hevc")
    }

    /// Whether the output gets `-tag:v hvc1`: HEVC video in an MP4-family container.
    #[must_use]
    pub fn tags_hvc1(&self) -> bool {
        let container = self.target_extension.to_ascii_lowercase();
        self.is_hevc_encoder() && HVC1_CONTAINERS.contains(&container.as_str())
    }
}

impl Default for EncodeProfile {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            crf: DEFAULT_CRF,
            preset: None,
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
        }
    }
}

/// Main configuration structure for the recodec-core library.
///
/// Typically created by the CLI through [`CoreConfigBuilder`] and passed to
/// [`crate::pipeline::Pipeline`].
///
/// # Examples
///
/// ```rust,no_run
/// use recodec_core::config::{CoreConfigBuilder, TranscodeFailurePolicy};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .source_root(PathBuf::from("/path/to/videos"))
///     .work_dir(PathBuf::from("/path/to/output"))
///     .crf(26)
///     .failure_policy(TranscodeFailurePolicy::Skip)
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory tree scanned for video files
    pub source_root: PathBuf,

    /// Output root; encoded files mirror their location under `source_root`
    pub work_dir: PathBuf,

    /// Recognised video file extensions
    pub extensions: ExtensionSet,

    /// Codec identifiers considered modern (case-insensitive substrings)
    pub modern_codecs: Vec<String>,

    pub profile: EncodeProfile,

    pub stream_policy: StreamSelectionPolicy,

    pub failure_policy: TranscodeFailurePolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            work_dir: PathBuf::from("."),
            extensions: ExtensionSet::default(),
            modern_codecs: DEFAULT_MODERN_CODECS.iter().map(|c| (*c).to_string()).collect(),
            profile: EncodeProfile::default(),
            stream_policy: StreamSelectionPolicy::default(),
            failure_policy: TranscodeFailurePolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with default settings for the given roots.
    #[must_use]
    pub fn new(source_root: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            source_root,
            work_dir,
            ..Self::default()
        }
    }

    /// Checks the configuration before any pipeline work begins.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source_root.as_os_str().is_empty() {
            return Err(CoreError::Config("source root is required".to_string()));
        }
        if !self.source_root.is_dir() {
            return Err(CoreError::Config(format!(
                "source root '{}' is not a directory",
                self.source_root.display()
            )));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(CoreError::Config("working directory is required".to_string()));
        }
        if std::path::absolute(&self.work_dir)? == std::path::absolute(&self.source_root)? {
            return Err(CoreError::Config(
                "working directory must not be the source root".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(CoreError::Config(
                "at least one video extension must be recognised".to_string(),
            ));
        }
        if self.modern_codecs.iter().all(|c| c.trim().is_empty()) {
            return Err(CoreError::Config(
                "at least one modern codec identifier is required".to_string(),
            ));
        }
        if self.profile.crf > MAX_CRF {
            return Err(CoreError::Config(format!(
                "crf must be between 0 and {}, got {}",
                MAX_CRF, self.profile.crf
            )));
        }
        if self.profile.video_codec.trim().is_empty() {
            return Err(CoreError::Config("video codec must not be empty".to_string()));
        }
        if self.profile.preset.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(CoreError::Config("preset must not be empty when given".to_string()));
        }
        let target = self.profile.target_extension.trim_start_matches('.');
        if target.is_empty() {
            return Err(CoreError::Config(
                "target extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.profile.video_codec, "libx265");
        assert_eq!(config.profile.crf, 28);
        assert_eq!(config.profile.preset, None);
        assert_eq!(config.profile.target_extension, "mp4");
        assert_eq!(config.modern_codecs, vec!["hevc", "av1", "h265"]);
        assert_eq!(config.stream_policy, StreamSelectionPolicy::OncePerFile);
        assert_eq!(config.failure_policy, TranscodeFailurePolicy::Abort);
        assert_eq!(config.extensions.len(), 5);
    }

    #[test]
    fn test_validate_accepts_existing_source() {
        let src = tempdir().unwrap();
        let config = CoreConfig::new(src.path().to_path_buf(), src.path().join("out"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_source() {
        let src = tempdir().unwrap();
        let config = CoreConfig::new(src.path().join("missing"), src.path().join("out"));
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig::new(PathBuf::new(), src.path().join("out"));
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_work_dir_equal_to_source() {
        let src = tempdir().unwrap();
        let config = CoreConfig::new(src.path().to_path_buf(), src.path().to_path_buf());
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        // Nested inside the source is allowed; discovery prunes it.
        let config = CoreConfig::new(src.path().to_path_buf(), src.path().join("output-1"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_profile() {
        let src = tempdir().unwrap();
        let mut config = CoreConfig::new(src.path().to_path_buf(), src.path().join("out"));
        config.profile.crf = 60;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::new(src.path().to_path_buf(), src.path().join("out"));
        config.profile.target_extension = ".".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::new(src.path().to_path_buf(), src.path().join("out"));
        config.extensions = ExtensionSet::new(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::new(src.path().to_path_buf(), src.path().join("out"));
        config.profile.preset = Some(" ".to_string());
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_hvc1_tag_follows_encoder_and_container() {
        let mut profile = EncodeProfile::default();
        assert!(profile.tags_hvc1());

        profile.video_codec = "hevc_nvenc".to_string();
        assert!(profile.tags_hvc1());

        profile.target_extension = "mkv".to_string();
        assert!(!profile.tags_hvc1());

        for encoder in ["libsvtav1", "libaom-av1", "libx264"] {
            let profile = EncodeProfile {
                video_codec: encoder.to_string(),
                ..EncodeProfile::default()
            };
            assert!(!profile.is_hevc_encoder(), "{encoder}");
            assert!(!profile.tags_hvc1(), "{encoder}");
        }
    }
}
