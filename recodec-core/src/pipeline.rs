// ============================================================================
// recodec-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Discovery -> codec filter -> transcode, one file at a time
//
// The orchestrator owns no file list. It pulls one candidate at a time from
// the codec filter (which in turn pulls from discovery), transcodes it, reports
// the result, and only then asks for the next path. Enumeration errors end the
// run; transcode errors end it too unless the failure policy is Skip. The
// working directory is pruned from discovery so earlier outputs are never
// picked up as inputs.
//
// AI-ASSISTANT-INFO: Sequential pull-based pipeline with fail-fast default and cancellation

use crate::config::{CoreConfig, TranscodeFailurePolicy};
use crate::discovery::{VideoFiles, find_video_files};
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher};
use crate::external::{FfmpegSpawner, FfprobeExecutor, FileMetadataProvider};
use crate::filter::{FilterStats, LegacyCodecFilter};
use crate::transcode::{TranscodeResult, Transcoder};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared flag asking a running pipeline to stop.
///
/// The pipeline checks it before pulling each file; the transcoder checks it
/// on every ffmpeg event and kills the encoder once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// A file whose transcode failed while the Skip policy was active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Successful transcodes, in discovery order
    pub results: Vec<TranscodeResult>,
    /// Transcodes that failed and were skipped
    pub failures: Vec<TranscodeFailure>,
    pub probed: usize,
    pub probe_failures: usize,
    pub skipped_modern: usize,
    pub cancelled: bool,
}

impl PipelineSummary {
    fn absorb_stats(&mut self, stats: FilterStats) {
        self.probed = stats.probed;
        self.probe_failures = stats.probe_failures;
        self.skipped_modern = stats.skipped;
    }

    #[must_use]
    pub fn total_input_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.input_size).sum()
    }

    #[must_use]
    pub fn total_output_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.output_size).sum()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Composes discovery, codec filtering and transcoding for one source tree.
pub struct Pipeline<'a, P, S, M>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    M: FileMetadataProvider,
{
    config: &'a CoreConfig,
    prober: &'a P,
    spawner: &'a S,
    metadata: &'a M,
    events: &'a EventDispatcher,
    cancel: CancellationToken,
}

impl<'a, P, S, M> Pipeline<'a, P, S, M>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    M: FileMetadataProvider,
{
    pub fn new(
        config: &'a CoreConfig,
        prober: &'a P,
        spawner: &'a S,
        metadata: &'a M,
        events: &'a EventDispatcher,
    ) -> Self {
        Self {
            config,
            prober,
            spawner,
            metadata,
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` instead of the pipeline's private, never-cancelled token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs the full pipeline.
    ///
    /// Returns `Err` on an enumeration failure, or on the first transcode
    /// failure under [`TranscodeFailurePolicy::Abort`]. Cancellation is not an
    /// error: the summary comes back with `cancelled` set.
    pub fn run(&self) -> CoreResult<PipelineSummary> {
        let config = self.config;
        self.events.emit(Event::PipelineStarted {
            source_root: config.source_root.clone(),
            work_dir: config.work_dir.clone(),
        });

        // The walk resolves the root to an absolute path; the transcoder must
        // strip the same prefix to mirror paths correctly.
        let source_root = std::path::absolute(&config.source_root)?;
        let work_dir = std::path::absolute(&config.work_dir)?;

        let files = self.discover(&work_dir)?;
        let mut selected = LegacyCodecFilter::new(
            files,
            self.prober,
            &config.modern_codecs,
            config.stream_policy,
            self.events,
        );
        let transcoder = Transcoder::new(self.spawner, self.metadata, &config.profile, self.events)
            .with_cancellation(self.cancel.clone());
        let mut summary = PipelineSummary::default();

        loop {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled(summary, selected.stats()));
            }

            let Some(next) = selected.next() else {
                break;
            };

            let input = match next {
                Ok(path) => path,
                Err(e) => {
                    self.events.emit(Event::EnumerationFailed {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };

            match transcoder.transcode(&input, &source_root, &work_dir) {
                Ok(result) => {
                    self.events.emit(Event::TranscodeCompleted {
                        result: result.clone(),
                    });
                    summary.results.push(result);
                }
                // A Ctrl+C also reaches ffmpeg, which may exit with an error
                // before the transcoder sees the cancelled token.
                Err(e) if matches!(e, CoreError::Cancelled) || self.cancel.is_cancelled() => {
                    log::debug!("Transcode of {} ended by cancellation: {}", input.display(), e);
                    return Ok(self.cancelled(summary, selected.stats()));
                }
                Err(e) => {
                    self.events.emit(Event::TranscodeFailed {
                        path: input.clone(),
                        error: e.to_string(),
                    });
                    match config.failure_policy {
                        TranscodeFailurePolicy::Abort => return Err(e),
                        TranscodeFailurePolicy::Skip => summary.failures.push(TranscodeFailure {
                            path: input,
                            error: e.to_string(),
                        }),
                    }
                }
            }
        }

        summary.absorb_stats(selected.stats());
        self.events.emit(Event::PipelineFinished {
            transcoded: summary.results.len(),
            failed: summary.failures.len(),
            probe_failures: summary.probe_failures,
            skipped_modern: summary.skipped_modern,
        });
        Ok(summary)
    }

    /// Runs discovery and codec filtering only, returning the files a full run
    /// would transcode.
    pub fn dry_run(&self) -> CoreResult<Vec<PathBuf>> {
        let work_dir = std::path::absolute(&self.config.work_dir)?;
        let files = self.discover(&work_dir)?;
        let mut selected = LegacyCodecFilter::new(
            files,
            self.prober,
            &self.config.modern_codecs,
            self.config.stream_policy,
            self.events,
        );

        let mut paths = Vec::new();
        while !self.cancel.is_cancelled() {
            let Some(item) = selected.next() else {
                break;
            };
            match item {
                Ok(path) => paths.push(path),
                Err(e) => {
                    self.events.emit(Event::EnumerationFailed {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }
        Ok(paths)
    }

    fn cancelled(&self, mut summary: PipelineSummary, stats: FilterStats) -> PipelineSummary {
        summary.absorb_stats(stats);
        summary.cancelled = true;
        self.events.emit(Event::PipelineCancelled {
            transcoded: summary.results.len(),
        });
        summary
    }

    fn discover(&self, work_dir: &Path) -> CoreResult<VideoFiles> {
        find_video_files(&self.config.source_root, &self.config.extensions)
            .and_then(|files| files.excluding(work_dir))
            .inspect_err(|e: &CoreError| {
                self.events.emit(Event::EnumerationFailed {
                    error: e.to_string(),
                });
            })
    }
}
