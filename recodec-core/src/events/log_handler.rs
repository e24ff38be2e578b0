//! Event handler that forwards pipeline events to the `log` facade.
//!
//! Every event becomes one leveled record: a short message followed by a
//! JSON key-value payload so the combined log file stays machine-readable.
//! Progress updates are throttled to milestones.

use super::{Event, EventHandler};
use crate::utils::format_bytes;

use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum percentage step between two logged progress lines.
const PROGRESS_STEP_PERCENT: u32 = 10;

/// Time after which progress is logged even without reaching the next step.
const PROGRESS_TIME_FALLBACK: Duration = Duration::from_secs(300);

pub struct LogEventHandler {
    last_logged_percent: Mutex<Option<u32>>,
    last_log_time: Mutex<Option<Instant>>,
}

impl Default for LogEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventHandler {
    pub fn new() -> Self {
        Self {
            last_logged_percent: Mutex::new(None),
            last_log_time: Mutex::new(None),
        }
    }

    fn reset_progress_state(&self) {
        if let Ok(mut last) = self.last_logged_percent.lock() {
            *last = None;
        }
        if let Ok(mut time) = self.last_log_time.lock() {
            *time = None;
        }
    }

    /// Decides whether a progress update at `percent` should be written.
    fn should_log_progress(&self, percent: f32) -> bool {
        let current = percent as u32;
        let now = Instant::now();

        let (Ok(mut last_logged), Ok(mut last_time)) =
            (self.last_logged_percent.lock(), self.last_log_time.lock())
        else {
            return false;
        };

        let should_log = match (*last_logged, *last_time) {
            (Some(logged), Some(at)) => {
                current >= logged + PROGRESS_STEP_PERCENT
                    || now.duration_since(at) >= PROGRESS_TIME_FALLBACK
            }
            _ => true,
        };

        if should_log {
            *last_logged = Some(current);
            *last_time = Some(now);
        }
        should_log
    }
}

impl EventHandler for LogEventHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::PipelineStarted {
                source_root,
                work_dir,
            } => {
                info!(
                    "Pipeline started {}",
                    json!({
                        "source_root": source_root.display().to_string(),
                        "work_dir": work_dir.display().to_string(),
                    })
                );
            }

            Event::CodecDetected {
                path,
                stream_index,
                codec_name,
                codec_long_name,
                classification,
            } => {
                info!(
                    "Codec detected {}",
                    json!({
                        "path": path.display().to_string(),
                        "stream_index": stream_index,
                        "codec_name": codec_name,
                        "codec_long_name": codec_long_name,
                        "classification": classification.to_string(),
                    })
                );
            }

            Event::FileSelected { path, codec_name } => {
                info!(
                    "Selected for transcoding {}",
                    json!({
                        "path": path.display().to_string(),
                        "codec_name": codec_name,
                    })
                );
            }

            Event::FileSkipped { path, reason } => {
                info!(
                    "Skipped {}",
                    json!({
                        "path": path.display().to_string(),
                        "reason": reason,
                    })
                );
            }

            Event::ProbeFailed { path, error } => {
                warn!(
                    "Probe failed, skipping file {}",
                    json!({
                        "path": path.display().to_string(),
                        "error": error,
                    })
                );
            }

            Event::TranscodeStarted { input, output } => {
                self.reset_progress_state();
                info!(
                    "Transcode started {}",
                    json!({
                        "input": input.display().to_string(),
                        "output": output.display().to_string(),
                    })
                );
            }

            Event::TranscodeProgress {
                input,
                percent,
                speed,
            } => {
                if *percent > 0.0 && self.should_log_progress(*percent) {
                    debug!(
                        "Transcode progress: {:.1}% at {:.2}x ({})",
                        percent,
                        speed,
                        input.display()
                    );
                }
            }

            Event::TranscodeCompleted { result } => {
                let payload = serde_json::to_string(result)
                    .unwrap_or_else(|e| format!("{{\"serialize_error\":\"{e}\"}}"));
                info!(
                    "Transcode completed ({} -> {}, {}%) {}",
                    format_bytes(result.input_size),
                    format_bytes(result.output_size),
                    result.transcode_ratio,
                    payload
                );
            }

            Event::TranscodeFailed { path, error } => {
                error!(
                    "Transcode failed {}",
                    json!({
                        "path": path.display().to_string(),
                        "error": error,
                    })
                );
            }

            Event::EnumerationFailed { error } => {
                error!(
                    "Error while enumerating files {}",
                    json!({ "error": error })
                );
            }

            Event::PipelineCancelled { transcoded } => {
                warn!(
                    "Pipeline cancelled {}",
                    json!({ "transcoded": transcoded })
                );
            }

            Event::PipelineFinished {
                transcoded,
                failed,
                probe_failures,
                skipped_modern,
            } => {
                info!(
                    "Pipeline finished {}",
                    json!({
                        "transcoded": transcoded,
                        "failed": failed,
                        "probe_failures": probe_failures,
                        "skipped_modern": skipped_modern,
                    })
                );
            }
        }
    }
}
