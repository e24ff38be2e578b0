//! Codec filter stage of the pipeline.
//!
//! [`LegacyCodecFilter`] wraps the discovery iterator and passes through only
//! the files whose video streams use a legacy codec. Files that cannot be
//! probed are reported and dropped; they never end the iteration. Upstream
//! enumeration errors are passed through unchanged.

use crate::config::StreamSelectionPolicy;
use crate::error::CoreResult;
use crate::events::{Event, EventDispatcher};
use crate::external::FfprobeExecutor;
use crate::inspect::classify_codec;

use std::collections::VecDeque;
use std::path::PathBuf;

/// Running counts kept while filtering, reported in the pipeline summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Files handed to the prober
    pub probed: usize,
    /// Files dropped because probing failed
    pub probe_failures: usize,
    /// Files dropped because every video stream was modern (or none existed)
    pub skipped: usize,
    /// Files selected for transcoding
    pub selected: usize,
}

/// Iterator adapter yielding paths whose video streams use a legacy codec.
pub struct LegacyCodecFilter<'a, I, P> {
    inner: I,
    prober: &'a P,
    modern_codecs: &'a [String],
    policy: StreamSelectionPolicy,
    events: &'a EventDispatcher,
    pending: VecDeque<PathBuf>,
    stats: FilterStats,
}

impl<'a, I, P> LegacyCodecFilter<'a, I, P>
where
    I: Iterator<Item = CoreResult<PathBuf>>,
    P: FfprobeExecutor,
{
    pub fn new(
        inner: I,
        prober: &'a P,
        modern_codecs: &'a [String],
        policy: StreamSelectionPolicy,
        events: &'a EventDispatcher,
    ) -> Self {
        Self {
            inner,
            prober,
            modern_codecs,
            policy,
            events,
            pending: VecDeque::new(),
            stats: FilterStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Probes one file and queues it once per selection the policy allows.
    fn inspect(&mut self, path: PathBuf) {
        self.stats.probed += 1;

        let streams = match self.prober.probe_streams(&path) {
            Ok(streams) => streams,
            Err(err) => {
                self.stats.probe_failures += 1;
                self.events.emit(Event::ProbeFailed {
                    path,
                    error: err.to_string(),
                });
                return;
            }
        };

        let mut selections = 0usize;
        let mut saw_video = false;

        for stream in streams.iter().filter(|s| s.is_video()) {
            saw_video = true;
            let classification = classify_codec(stream.codec_name.as_deref(), self.modern_codecs);

            self.events.emit(Event::CodecDetected {
                path: path.clone(),
                stream_index: stream.index,
                codec_name: stream.codec_label().to_string(),
                codec_long_name: stream.codec_long_name.clone(),
                classification,
            });

            if !classification.is_legacy() {
                continue;
            }

            let already_selected = selections > 0;
            if already_selected && self.policy == StreamSelectionPolicy::OncePerFile {
                continue;
            }

            selections += 1;
            self.events.emit(Event::FileSelected {
                path: path.clone(),
                codec_name: stream.codec_label().to_string(),
            });
            self.pending.push_back(path.clone());
        }

        if selections == 0 {
            self.stats.skipped += 1;
            let reason = if saw_video {
                "modern codec"
            } else {
                "no video stream"
            };
            self.events.emit(Event::FileSkipped {
                path,
                reason: reason.to_string(),
            });
        } else {
            self.stats.selected += 1;
        }
    }
}

impl<I, P> Iterator for LegacyCodecFilter<'_, I, P>
where
    I: Iterator<Item = CoreResult<PathBuf>>,
    P: FfprobeExecutor,
{
    type Item = CoreResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.pending.pop_front() {
                return Some(Ok(path));
            }

            match self.inner.next()? {
                Ok(path) => self.inspect(path),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
