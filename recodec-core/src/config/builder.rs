// ============================================================================
// recodec-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent API used by the CLI to turn parsed arguments into a CoreConfig.
// Unset fields fall back to the defaults in CoreConfig::default().
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

use std::path::PathBuf;

use super::{CoreConfig, StreamSelectionPolicy, TranscodeFailurePolicy};
use crate::discovery::ExtensionSet;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use recodec_core::config::{CoreConfigBuilder, StreamSelectionPolicy};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .source_root(PathBuf::from("/videos"))
///     .work_dir(PathBuf::from("/out"))
///     .target_extension(".mkv")
///     .stream_policy(StreamSelectionPolicy::OncePerStream)
///     .build();
/// assert_eq!(config.profile.target_extension, "mkv");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_root(mut self, path: PathBuf) -> Self {
        self.config.source_root = path;
        self
    }

    pub fn work_dir(mut self, path: PathBuf) -> Self {
        self.config.work_dir = path;
        self
    }

    pub fn extensions(mut self, extensions: ExtensionSet) -> Self {
        self.config.extensions = extensions;
        self
    }

    pub fn modern_codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.modern_codecs = codecs
            .into_iter()
            .map(Into::into)
            .map(|c: String| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn video_codec(mut self, codec: impl Into<String>) -> Self {
        self.config.profile.video_codec = codec.into();
        self
    }

    pub fn crf(mut self, crf: u8) -> Self {
        self.config.profile.crf = crf;
        self
    }

    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.config.profile.preset = Some(preset.into());
        self
    }

    /// Sets the output container extension; a leading dot is stripped.
    pub fn target_extension(mut self, ext: &str) -> Self {
        self.config.profile.target_extension = ext.trim().trim_start_matches('.').to_string();
        self
    }

    pub fn stream_policy(mut self, policy: StreamSelectionPolicy) -> Self {
        self.config.stream_policy = policy;
        self
    }

    pub fn failure_policy(mut self, policy: TranscodeFailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = CoreConfigBuilder::new()
            .source_root(PathBuf::from("/src"))
            .work_dir(PathBuf::from("/work"))
            .extensions(ExtensionSet::parse("mkv"))
            .modern_codecs(["vp9", " ", "av1"])
            .video_codec("libsvtav1")
            .crf(30)
            .preset("8")
            .target_extension(".mkv")
            .failure_policy(TranscodeFailurePolicy::Skip)
            .build();

        assert_eq!(config.source_root, PathBuf::from("/src"));
        assert_eq!(config.work_dir, PathBuf::from("/work"));
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.modern_codecs, vec!["vp9", "av1"]);
        assert_eq!(config.profile.video_codec, "libsvtav1");
        assert_eq!(config.profile.crf, 30);
        assert_eq!(config.profile.preset.as_deref(), Some("8"));
        assert_eq!(config.profile.target_extension, "mkv");
        assert!(!config.profile.tags_hvc1());
        assert_eq!(config.stream_policy, StreamSelectionPolicy::OncePerFile);
        assert_eq!(config.failure_policy, TranscodeFailurePolicy::Skip);
    }
}
