// recodec-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---
//
// Deterministic stand-ins for ffprobe, ffmpeg and the event sink so the
// pipeline can be exercised without media files or installed binaries.

use super::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use crate::error::{CoreResult, command_start_error, probe_error};
use crate::events::{Event, EventHandler};
use crate::external::ffmpeg_executor::command_args;
use crate::inspect::StreamDescriptor;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::sync::Mutex;

/// Builds a progress event as ffmpeg-sidecar would parse it from stderr.
pub fn progress_event(time: &str, speed: f32) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 0,
        fps: 0.0,
        q: 0.0,
        size_kb: 0,
        time: time.to_string(),
        bitrate_kbps: 0.0,
        speed,
        raw_log_message: String::new(),
    })
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
    /// Incremented on every kill, shared with the spawner that created it.
    pub kills: Rc<Cell<usize>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.kills.set(self.kills.get() + 1);
        Ok(())
    }
}

enum MockOutcome {
    /// Exit 0, writing `output_bytes` bytes to the output path when set.
    Success {
        events: Vec<FfmpegEvent>,
        output_bytes: Option<usize>,
    },
    ExitError { events: Vec<FfmpegEvent>, code: i32 },
    SpawnError,
}

/// Represents an expected ffmpeg command call and its mock result.
struct MockFfmpegExpectation {
    arg_pattern: String,
    outcome: MockOutcome,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// An expectation matches when any argument contains its pattern, and is
/// consumed by the first matching spawn. Calls that match nothing fall back
/// to the default outcome if one is set, and panic otherwise.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    default_output_bytes: Rc<RefCell<Option<usize>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    kills: Rc<Cell<usize>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// Every unmatched command succeeds and writes an output of `output_bytes`.
    pub fn with_default_success(output_bytes: usize) -> Self {
        let spawner = Self::new();
        *spawner.default_output_bytes.borrow_mut() = Some(output_bytes);
        spawner
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        output_bytes: Option<usize>,
    ) {
        self.push(arg_pattern, MockOutcome::Success { events, output_bytes });
    }

    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, code: i32) {
        self.push(arg_pattern, MockOutcome::ExitError { events, code });
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str) {
        self.push(arg_pattern, MockOutcome::SpawnError);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of spawned processes killed before they finished.
    pub fn kill_count(&self) -> usize {
        self.kills.get()
    }

    fn push(&self, arg_pattern: &str, outcome: MockOutcome) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            outcome,
        });
    }

    fn process(&self, events: Vec<FfmpegEvent>, code: i32) -> MockFfmpegProcess {
        MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            // Raw wait status: the exit code lives in the second byte.
            exit_status: ExitStatus::from_raw(code << 8),
            kills: Rc::clone(&self.kills),
        }
    }

    fn write_dummy_output(args: &[String], output_bytes: usize) {
        let Some(output_path) = args.last().map(PathBuf::from) else {
            log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
            return;
        };
        if let Some(parent) = output_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("MockFfmpegSpawner failed to create parent dir {:?}: {}", parent, e);
            }
        }
        if let Err(e) = std::fs::write(&output_path, vec![0u8; output_bytes]) {
            log::error!("MockFfmpegSpawner failed to create dummy output file {:?}: {}", output_path, e);
        }
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_args(&mut cmd);
        self.received_calls.borrow_mut().push(args.clone());

        let found = {
            let mut expectations = self.expectations.borrow_mut();
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index))
        };

        let outcome = match (found, *self.default_output_bytes.borrow()) {
            (Some(expectation), _) => {
                log::debug!("MockFfmpegSpawner: Matched expectation with pattern '{}'", expectation.arg_pattern);
                expectation.outcome
            }
            (None, Some(output_bytes)) => MockOutcome::Success {
                events: Vec::new(),
                output_bytes: Some(output_bytes),
            },
            (None, None) => {
                panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            }
        };

        match outcome {
            MockOutcome::Success { events, output_bytes } => {
                if let Some(bytes) = output_bytes {
                    Self::write_dummy_output(&args, bytes);
                }
                Ok(self.process(events, 0))
            }
            MockOutcome::ExitError { events, code } => Ok(self.process(events, code)),
            MockOutcome::SpawnError => Err(command_start_error(
                "ffmpeg (mock)",
                io::Error::new(io::ErrorKind::NotFound, "simulated spawn failure"),
            )),
        }
    }
}

/// Mock implementation of FfprobeExecutor.
///
/// Results are registered per path; probing an unregistered path fails like
/// an unparseable file would.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Rc<RefCell<HashMap<PathBuf, Result<Vec<StreamDescriptor>, String>>>>,
    calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_streams(&self, input_path: &Path, streams: Vec<StreamDescriptor>) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), Ok(streams));
    }

    pub fn expect_failure(&self, input_path: &Path, message: &str) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), Err(message.to_string()));
    }

    /// Paths probed so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_streams(&self, input_path: &Path) -> CoreResult<Vec<StreamDescriptor>> {
        self.calls.borrow_mut().push(input_path.to_path_buf());
        match self.results.borrow().get(input_path) {
            Some(Ok(streams)) => Ok(streams.clone()),
            Some(Err(message)) => Err(probe_error(input_path, message.clone())),
            None => Err(probe_error(
                input_path,
                "MockFfprobeExecutor: no expectation set for path",
            )),
        }
    }
}

/// Event handler that keeps every event it receives.
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventHandler for RecordingEventHandler {
    fn handle(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
