//! JSON event handler for structured pipeline output
//!
//! Writes one JSON object per line for every pipeline event except the
//! high-frequency progress updates, which are thinned to 5% steps. Intended
//! for consumption by scripts wrapping the CLI.

use super::{Event, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs pipeline events as JSON lines to stdout
pub struct JsonEventHandler {
    output: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<Option<u32>>,
}

impl JsonEventHandler {
    /// Create a new JSON event handler that writes to stdout
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Create a new JSON event handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
            last_progress_bucket: Mutex::new(None),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl EventHandler for JsonEventHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        let value = match event {
            Event::PipelineStarted {
                source_root,
                work_dir,
            } => json!({
                "type": "pipeline_started",
                "source_root": source_root.display().to_string(),
                "work_dir": work_dir.display().to_string(),
                "timestamp": timestamp
            }),

            Event::CodecDetected {
                path,
                stream_index,
                codec_name,
                codec_long_name,
                classification,
            } => json!({
                "type": "codec_detected",
                "path": path.display().to_string(),
                "stream_index": stream_index,
                "codec_name": codec_name,
                "codec_long_name": codec_long_name,
                "classification": classification,
                "timestamp": timestamp
            }),

            Event::FileSelected { path, codec_name } => json!({
                "type": "file_selected",
                "path": path.display().to_string(),
                "codec_name": codec_name,
                "timestamp": timestamp
            }),

            Event::FileSkipped { path, reason } => json!({
                "type": "file_skipped",
                "path": path.display().to_string(),
                "reason": reason,
                "timestamp": timestamp
            }),

            Event::ProbeFailed { path, error } => json!({
                "type": "probe_failed",
                "path": path.display().to_string(),
                "error": error,
                "timestamp": timestamp
            }),

            Event::TranscodeStarted { input, output } => {
                if let Ok(mut bucket) = self.last_progress_bucket.lock() {
                    *bucket = None;
                }
                json!({
                    "type": "transcode_started",
                    "input": input.display().to_string(),
                    "output": output.display().to_string(),
                    "timestamp": timestamp
                })
            }

            Event::TranscodeProgress {
                input,
                percent,
                speed,
            } => {
                let bucket = (*percent as u32) / 5;
                let Ok(mut last) = self.last_progress_bucket.lock() else {
                    return;
                };
                if *last == Some(bucket) {
                    return;
                }
                *last = Some(bucket);
                json!({
                    "type": "transcode_progress",
                    "input": input.display().to_string(),
                    "percent": percent,
                    "speed": speed,
                    "timestamp": timestamp
                })
            }

            Event::TranscodeCompleted { result } => json!({
                "type": "transcode_completed",
                "result": result,
                "timestamp": timestamp
            }),

            Event::TranscodeFailed { path, error } => json!({
                "type": "transcode_failed",
                "path": path.display().to_string(),
                "error": error,
                "timestamp": timestamp
            }),

            Event::EnumerationFailed { error } => json!({
                "type": "enumeration_failed",
                "error": error,
                "timestamp": timestamp
            }),

            Event::PipelineCancelled { transcoded } => json!({
                "type": "pipeline_cancelled",
                "transcoded": transcoded,
                "timestamp": timestamp
            }),

            Event::PipelineFinished {
                transcoded,
                failed,
                probe_failures,
                skipped_modern,
            } => json!({
                "type": "pipeline_finished",
                "transcoded": transcoded,
                "failed": failed,
                "probe_failures": probe_failures,
                "skipped_modern": skipped_modern,
                "timestamp": timestamp
            }),
        };

        self.write_json(value);
    }
}

impl Default for JsonEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::TranscodeResult;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct MockWriter {
        content: Arc<Mutex<Vec<u8>>>,
    }

    impl MockWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let content = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    content: content.clone(),
                },
                content,
            )
        }
    }

    impl Write for MockWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.content.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(content: &Arc<Mutex<Vec<u8>>>) -> Vec<serde_json::Value> {
        let output = String::from_utf8(content.lock().unwrap().clone()).unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_transcode_completed_json() {
        let (writer, content) = MockWriter::new();
        let handler = JsonEventHandler::with_writer(Box::new(writer));

        let result = TranscodeResult::new(
            PathBuf::from("/src/a/clip.avi"),
            PathBuf::from("/work/a/clip.mp4"),
            1000,
            250,
            Duration::from_secs(12),
        );
        handler.handle(&Event::TranscodeCompleted { result });

        let parsed = lines(&content);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["type"], "transcode_completed");
        assert_eq!(parsed[0]["result"]["input_path"], "/src/a/clip.avi");
        assert_eq!(parsed[0]["result"]["output_path"], "/work/a/clip.mp4");
        assert_eq!(parsed[0]["result"]["input_size"], 1000);
        assert_eq!(parsed[0]["result"]["output_size"], 250);
        assert_eq!(parsed[0]["result"]["transcode_ratio"], 25);
        assert_eq!(parsed[0]["result"]["encode_seconds"], 12.0);
    }

    #[test]
    fn test_progress_is_thinned() {
        let (writer, content) = MockWriter::new();
        let handler = JsonEventHandler::with_writer(Box::new(writer));
        let input = PathBuf::from("/src/clip.avi");

        for percent in [0.5_f32, 1.0, 2.0, 5.5, 6.0, 11.0] {
            handler.handle(&Event::TranscodeProgress {
                input: input.clone(),
                percent,
                speed: 1.0,
            });
        }

        let parsed = lines(&content);
        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().all(|v| v["type"] == "transcode_progress"));
    }

    #[test]
    fn test_probe_failed_json() {
        let (writer, content) = MockWriter::new();
        let handler = JsonEventHandler::with_writer(Box::new(writer));

        handler.handle(&Event::ProbeFailed {
            path: PathBuf::from("/src/broken.mkv"),
            error: "invalid data".to_string(),
        });

        let parsed = lines(&content);
        assert_eq!(parsed[0]["type"], "probe_failed");
        assert_eq!(parsed[0]["path"], "/src/broken.mkv");
        assert_eq!(parsed[0]["error"], "invalid data");
    }
}
