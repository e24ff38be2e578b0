// recodec-cli/src/config.rs
//
// Turns parsed arguments into a recodec-core configuration and resolves the
// working directory.

use crate::cli::Cli;
use crate::logging::get_timestamp;

use recodec_core::config::{CoreConfig, CoreConfigBuilder, StreamSelectionPolicy, TranscodeFailurePolicy};
use recodec_core::discovery::ExtensionSet;
use std::path::{Path, PathBuf};

/// Prefix of the working directory created when `--work-dir` is not given.
pub const DEFAULT_WORK_DIR_PREFIX: &str = "output-";

/// The working directory for this run: the `--work-dir` value, or a fresh
/// timestamped directory under `cwd`.
pub fn resolve_work_dir(cli: &Cli, cwd: &Path) -> PathBuf {
    match &cli.work_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => cwd.join(dir),
        None => cwd.join(format!("{}{}", DEFAULT_WORK_DIR_PREFIX, get_timestamp())),
    }
}

/// Creates a CoreConfig from CLI arguments.
pub fn create_core_config(cli: &Cli, work_dir: PathBuf) -> CoreConfig {
    let stream_policy = if cli.once_per_stream {
        StreamSelectionPolicy::OncePerStream
    } else {
        StreamSelectionPolicy::OncePerFile
    };
    let failure_policy = if cli.continue_on_error {
        TranscodeFailurePolicy::Skip
    } else {
        TranscodeFailurePolicy::Abort
    };

    let mut builder = CoreConfigBuilder::new()
        .source_root(cli.src.clone())
        .work_dir(work_dir)
        .extensions(ExtensionSet::parse(&cli.extensions))
        .modern_codecs(cli.modern_codecs.iter().cloned())
        .video_codec(cli.video_codec.clone())
        .crf(cli.crf)
        .target_extension(&cli.target_ext)
        .stream_policy(stream_policy)
        .failure_policy(failure_policy);
    if let Some(preset) = &cli.preset {
        builder = builder.preset(preset.clone());
    }
    builder.build()
}
