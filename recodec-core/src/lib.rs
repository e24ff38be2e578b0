//! Core library for finding and re-encoding videos stored in legacy codecs.
//!
//! A run is a lazy three-stage pipeline: [`discovery`] walks a source tree
//! for video files, [`filter`] probes each one with ffprobe and keeps only
//! those whose video streams are not already HEVC/AV1, and [`transcode`]
//! re-encodes the survivors with ffmpeg into a mirrored tree under the
//! working directory. [`pipeline::Pipeline`] pulls files through the stages
//! one at a time.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use recodec_core::{CoreConfig, EventDispatcher, Pipeline};
//! use recodec_core::external::{CrateFfprobeExecutor, SidecarSpawner, StdFsMetadataProvider};
//! use std::path::PathBuf;
//!
//! let config = CoreConfig::new(PathBuf::from("/videos"), PathBuf::from("/videos-out"));
//! config.validate().unwrap();
//!
//! let events = EventDispatcher::new();
//! let prober = CrateFfprobeExecutor::new();
//! let pipeline = Pipeline::new(
//!     &config,
//!     &prober,
//!     &SidecarSpawner,
//!     &StdFsMetadataProvider,
//!     &events,
//! );
//! let summary = pipeline.run().unwrap();
//! println!("{} files transcoded", summary.results.len());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod external;
pub mod filter;
pub mod inspect;
pub mod logging;
pub mod pipeline;
pub mod transcode;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, StreamSelectionPolicy, TranscodeFailurePolicy};
pub use discovery::{ExtensionSet, find_video_files};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventDispatcher, EventHandler};
pub use pipeline::{CancellationToken, Pipeline, PipelineSummary};
pub use transcode::TranscodeResult;
pub use utils::{change_extension, format_bytes, format_duration};
