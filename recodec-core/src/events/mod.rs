//! Pipeline events and their dispatch.
//!
//! Pipeline stages never log through a global logger directly. They emit
//! [`Event`]s on an [`EventDispatcher`] owned by whoever runs the pipeline,
//! and each registered [`EventHandler`] decides how to render them (log
//! records, JSON lines, terminal output).

use crate::inspect::CodecClassification;
use crate::transcode::TranscodeResult;

use std::path::PathBuf;
use std::sync::Arc;

pub mod json_handler;
pub mod log_handler;

#[derive(Debug, Clone)]
pub enum Event {
    PipelineStarted {
        source_root: PathBuf,
        work_dir: PathBuf,
    },

    // Codec filter events
    CodecDetected {
        path: PathBuf,
        stream_index: i64,
        codec_name: String,
        codec_long_name: Option<String>,
        classification: CodecClassification,
    },
    FileSelected {
        path: PathBuf,
        codec_name: String,
    },
    FileSkipped {
        path: PathBuf,
        reason: String,
    },
    ProbeFailed {
        path: PathBuf,
        error: String,
    },

    // Transcoder events
    TranscodeStarted {
        input: PathBuf,
        output: PathBuf,
    },
    TranscodeProgress {
        input: PathBuf,
        percent: f32,
        speed: f32,
    },
    TranscodeCompleted {
        result: TranscodeResult,
    },
    TranscodeFailed {
        path: PathBuf,
        error: String,
    },

    // Terminal pipeline events
    EnumerationFailed {
        error: String,
    },
    PipelineCancelled {
        transcoded: usize,
    },
    PipelineFinished {
        transcoded: usize,
        failed: usize,
        probe_failures: usize,
        skipped_modern: usize,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

/// Fans each emitted event out to every registered handler, in registration order.
#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
