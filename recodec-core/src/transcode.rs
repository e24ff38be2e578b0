// ============================================================================
// recodec-core/src/transcode.rs
// ============================================================================
//
// TRANSCODER: Re-encodes one legacy-codec file into the working directory
//
// The output path mirrors the input's location under the source root, with
// the extension forced to the profile's target container. The encoder runs as
// an ffmpeg child process built from an argument vector; its progress events
// are forwarded to the event dispatcher while it runs. A cancelled run kills
// the encoder at its next event.
//
// AI-ASSISTANT-INFO: Single-file transcode with mirrored output path and size statistics

use crate::config::EncodeProfile;
use crate::error::{CoreError, CoreResult, transcode_error};
use crate::events::{Event, EventDispatcher};
use crate::external::{FfmpegProcess, FfmpegSpawner, FileMetadataProvider};
use crate::pipeline::CancellationToken;
use crate::utils::{calculate_transcode_ratio, change_extension, parse_ffmpeg_time};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Statistics for one successfully transcoded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeResult {
    #[serde(serialize_with = "serialize_path_lossy")]
    pub input_path: PathBuf,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub output_path: PathBuf,
    pub input_size: u64,
    pub output_size: u64,
    /// `floor(output_size * 100 / input_size)`
    pub transcode_ratio: u64,
    #[serde(rename = "encode_seconds", serialize_with = "serialize_duration_secs")]
    pub duration: Duration,
}

impl TranscodeResult {
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        input_size: u64,
        output_size: u64,
        duration: Duration,
    ) -> Self {
        Self {
            input_path,
            output_path,
            input_size,
            output_size,
            transcode_ratio: calculate_transcode_ratio(input_size, output_size),
            duration,
        }
    }
}

fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn serialize_duration_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Computes where the encoded version of `input` is written.
///
/// The relative location of `input` under `source_root` is reproduced under
/// `work_dir`, and the final extension is replaced by `target_ext`.
pub fn output_path_for(
    input: &Path,
    source_root: &Path,
    work_dir: &Path,
    target_ext: &str,
) -> CoreResult<PathBuf> {
    let relative = input.strip_prefix(source_root).map_err(|_| {
        CoreError::PathError(format!(
            "'{}' is not inside source root '{}'",
            input.display(),
            source_root.display()
        ))
    })?;
    if relative.as_os_str().is_empty() {
        return Err(CoreError::PathError(format!(
            "'{}' is the source root itself, not a file beneath it",
            input.display()
        )));
    }
    Ok(change_extension(&work_dir.join(relative), target_ext))
}

/// Builds the ffmpeg argument vector for one encode.
pub fn build_encode_command(profile: &EncodeProfile, input: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.overwrite();
    cmd.arg("-i").arg(input);
    cmd.args(["-map", "0:v", "-map", "0:a?"]);
    cmd.arg("-c:v").arg(&profile.video_codec);
    cmd.arg("-crf").arg(profile.crf.to_string());
    if let Some(preset) = &profile.preset {
        cmd.arg("-preset").arg(preset);
    }
    if profile.tags_hvc1() {
        cmd.args(["-tag:v", "hvc1"]);
    }
    cmd.args(["-c:a", "copy"]);
    cmd.arg(output);
    cmd
}

/// Runs single-file encodes with a fixed profile.
pub struct Transcoder<'a, S: FfmpegSpawner, M: FileMetadataProvider> {
    spawner: &'a S,
    metadata: &'a M,
    profile: &'a EncodeProfile,
    events: &'a EventDispatcher,
    cancel: CancellationToken,
}

impl<'a, S: FfmpegSpawner, M: FileMetadataProvider> Transcoder<'a, S, M> {
    pub fn new(
        spawner: &'a S,
        metadata: &'a M,
        profile: &'a EncodeProfile,
        events: &'a EventDispatcher,
    ) -> Self {
        Self {
            spawner,
            metadata,
            profile,
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Kills the running encode once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Encodes `input` into its mirrored location under `work_dir`.
    ///
    /// Fails with [`CoreError::Transcode`] when ffmpeg cannot be started,
    /// exits non-zero, or when either file's size cannot be read afterwards.
    /// Fails with [`CoreError::Cancelled`] when the token is cancelled while
    /// ffmpeg runs; the partial output is left in place.
    pub fn transcode(
        &self,
        input: &Path,
        source_root: &Path,
        work_dir: &Path,
    ) -> CoreResult<TranscodeResult> {
        let output = output_path_for(input, source_root, work_dir, &self.profile.target_extension)?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                transcode_error(
                    input,
                    format!("could not create output directory '{}': {}", parent.display(), e),
                )
            })?;
        }

        self.events.emit(Event::TranscodeStarted {
            input: input.to_path_buf(),
            output: output.clone(),
        });

        let started = Instant::now();
        self.run_encoder(input, &output)?;
        let duration = started.elapsed();

        let input_size = self
            .metadata
            .get_size(input)
            .map_err(|e| transcode_error(input, format!("input size unreadable after encode: {e}")))?;
        let output_size = self.metadata.get_size(&output).map_err(|e| {
            transcode_error(
                input,
                format!("output '{}' missing or unreadable: {}", output.display(), e),
            )
        })?;

        Ok(TranscodeResult::new(
            input.to_path_buf(),
            output,
            input_size,
            output_size,
            duration,
        ))
    }

    fn run_encoder(&self, input: &Path, output: &Path) -> CoreResult<()> {
        let cmd = build_encode_command(self.profile, input, output);
        let mut process = self
            .spawner
            .spawn(cmd)
            .map_err(|e| transcode_error(input, e.to_string()))?;

        let mut total_secs: Option<f64> = None;
        let mut last_error: Option<String> = None;
        let cancel = &self.cancel;

        let handled = process.handle_events(|event| {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            match event {
                FfmpegEvent::ParsedDuration(parsed) => {
                    if total_secs.is_none() && parsed.duration > 0.0 {
                        total_secs = Some(parsed.duration);
                    }
                }
                FfmpegEvent::Progress(progress) => {
                    let percent = match (total_secs, parse_ffmpeg_time(&progress.time)) {
                        (Some(total), Some(elapsed)) => {
                            ((elapsed / total) * 100.0).clamp(0.0, 100.0) as f32
                        }
                        _ => 0.0,
                    };
                    self.events.emit(Event::TranscodeProgress {
                        input: input.to_path_buf(),
                        percent,
                        speed: progress.speed,
                    });
                }
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                    log::debug!("ffmpeg: {}", line);
                    last_error = Some(line);
                }
                _ => {}
            }
            Ok(())
        });

        if let Err(e) = handled {
            // The encoder must not outlive an abandoned encode.
            if let Err(kill_err) = process.kill() {
                log::warn!("Failed to kill ffmpeg for {}: {}", input.display(), kill_err);
            }
            if let Err(wait_err) = process.wait() {
                log::warn!("Failed to reap ffmpeg for {}: {}", input.display(), wait_err);
            }
            return Err(match e {
                CoreError::Cancelled => {
                    log::warn!("Encode of {} cancelled", input.display());
                    CoreError::Cancelled
                }
                other => transcode_error(input, other.to_string()),
            });
        }

        let status = process
            .wait()
            .map_err(|e| transcode_error(input, e.to_string()))?;

        if !status.success() {
            let message = match last_error {
                Some(line) => format!("ffmpeg exited with {status}: {line}"),
                None => format!("ffmpeg exited with {status}"),
            };
            return Err(transcode_error(input, message));
        }
        Ok(())
    }
}
