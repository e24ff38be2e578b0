//! Stream metadata and codec classification.
//!
//! The prober returns one [`StreamDescriptor`] per stream in the container.
//! Only video streams are classified; a video stream whose codec short name
//! contains one of the configured modern identifiers is [`CodecClassification::Modern`],
//! everything else is [`CodecClassification::Legacy`].

use serde::Serialize;
use std::fmt;

/// Modern codec identifiers used when no explicit list is configured.
pub const DEFAULT_MODERN_CODECS: &[&str] = &["hevc", "av1", "h265"];

/// Kind of a stream as reported by ffprobe's `codec_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Other(String),
}

impl StreamKind {
    /// Maps ffprobe's `codec_type` string; a missing type becomes `Other("unknown")`.
    #[must_use]
    pub fn from_codec_type(codec_type: Option<&str>) -> Self {
        match codec_type {
            Some("video") => StreamKind::Video,
            Some("audio") => StreamKind::Audio,
            Some(other) => StreamKind::Other(other.to_string()),
            None => StreamKind::Other("unknown".to_string()),
        }
    }
}

/// Per-stream metadata obtained from a single probe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub index: i64,
    pub kind: StreamKind,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
}

impl StreamDescriptor {
    /// Convenience constructor for a video stream.
    pub fn video(index: i64, codec_name: &str) -> Self {
        Self {
            index,
            kind: StreamKind::Video,
            codec_name: Some(codec_name.to_string()),
            codec_long_name: None,
        }
    }

    /// Convenience constructor for an audio stream.
    pub fn audio(index: i64, codec_name: &str) -> Self {
        Self {
            index,
            kind: StreamKind::Audio,
            codec_name: Some(codec_name.to_string()),
            codec_long_name: None,
        }
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == StreamKind::Video
    }

    /// Codec short name for display, `"unknown"` when ffprobe reported none.
    #[must_use]
    pub fn codec_label(&self) -> &str {
        self.codec_name.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecClassification {
    Modern,
    Legacy,
}

impl CodecClassification {
    #[must_use]
    pub fn is_legacy(self) -> bool {
        self == CodecClassification::Legacy
    }
}

impl fmt::Display for CodecClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecClassification::Modern => write!(f, "modern"),
            CodecClassification::Legacy => write!(f, "legacy"),
        }
    }
}

/// Classifies a codec short name by case-insensitive substring match against
/// `modern_codecs`. A stream without a codec name is legacy.
#[must_use]
pub fn classify_codec<S: AsRef<str>>(
    codec_name: Option<&str>,
    modern_codecs: &[S],
) -> CodecClassification {
    let Some(name) = codec_name else {
        return CodecClassification::Legacy;
    };
    let name = name.to_ascii_lowercase();

    let is_modern = modern_codecs.iter().any(|modern| {
        let modern = modern.as_ref().trim().to_ascii_lowercase();
        !modern.is_empty() && name.contains(&modern)
    });

    if is_modern {
        CodecClassification::Modern
    } else {
        CodecClassification::Legacy
    }
}
