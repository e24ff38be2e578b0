// ============================================================================
// recodec-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Progress bar and run summary
//
// Log records already reach the console through log4rs. This module adds the
// interactive parts: an indicatif bar for the file currently being encoded,
// and the styled summary printed when the run ends.
//
// AI-ASSISTANT-INFO: Terminal progress bar handler and summary rendering

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use recodec_core::events::{Event, EventHandler};
use recodec_core::{PipelineSummary, format_bytes, format_duration};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";
    pub const STATUS_INDENT: &str = "  ";
    pub const PROGRESS_TEMPLATE: &str =
        "{spinner:.green} {msg} [{bar:40.cyan/blue}] {percent}% {prefix} ({eta})";
    pub const PROGRESS_CHARS: &str = "█▓▒░ ";
}

// ============================================================================
// PROGRESS BAR HANDLER
// ============================================================================

/// Shows one progress bar per running encode on stderr.
///
/// The bar is hidden when stderr is not a terminal, so redirected runs only
/// get the log output.
pub struct ProgressBarHandler {
    current: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl ProgressBarHandler {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            interactive: Term::stderr().is_term(),
        }
    }

    fn create_bar(&self, label: &str) -> ProgressBar {
        let target = if self.interactive {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let pb = ProgressBar::with_draw_target(Some(100), target);
        let bar_style = ProgressStyle::default_bar()
            .template(styling::PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(styling::PROGRESS_CHARS);
        pb.set_style(bar_style);
        pb.set_message(label.to_string());
        if self.interactive {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        pb
    }

    fn finish_current(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(pb) = current.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for ProgressBarHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for ProgressBarHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::TranscodeStarted { input, .. } => {
                self.finish_current();
                let pb = self.create_bar(&file_label(input));
                if let Ok(mut current) = self.current.lock() {
                    *current = Some(pb);
                }
            }
            Event::TranscodeProgress { percent, speed, .. } => {
                if let Ok(current) = self.current.lock() {
                    if let Some(pb) = current.as_ref() {
                        pb.set_position(percent.clamp(0.0, 100.0) as u64);
                        if *speed > 0.0 {
                            pb.set_prefix(format!("{speed:.1}x"));
                        }
                    }
                }
            }
            Event::TranscodeCompleted { .. }
            | Event::TranscodeFailed { .. }
            | Event::PipelineCancelled { .. }
            | Event::PipelineFinished { .. } => self.finish_current(),
            _ => {}
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// SUMMARY
// ============================================================================

fn section(title: &str) -> String {
    format!(
        "{}",
        style(format!("{}{}{}", styling::SECTION_PREFIX, title, styling::SECTION_SUFFIX))
            .cyan()
            .bold()
    )
}

/// Renders the end-of-run summary.
pub fn render_summary(summary: &PipelineSummary, work_dir: &Path) -> String {
    let indent = styling::STATUS_INDENT;
    let mut out = String::new();

    let _ = writeln!(out, "{}", section("Summary"));
    for result in &summary.results {
        let _ = writeln!(
            out,
            "{} {}",
            style(styling::SUCCESS_SYMBOL).green(),
            style(result.input_path.display()).bold()
        );
        let _ = writeln!(out, "{indent}Output:      {}", result.output_path.display());
        let _ = writeln!(
            out,
            "{indent}Size:        {} -> {} ({}%)",
            format_bytes(result.input_size),
            format_bytes(result.output_size),
            result.transcode_ratio
        );
        let _ = writeln!(
            out,
            "{indent}Encode time: {}",
            format_duration(result.duration.as_secs_f64())
        );
    }
    for failure in &summary.failures {
        let _ = writeln!(
            out,
            "{} {}",
            style(styling::ERROR_SYMBOL).red().bold(),
            style(failure.path.display()).bold()
        );
        let _ = writeln!(out, "{indent}{}", style(&failure.error).red());
    }

    let _ = writeln!(
        out,
        "Transcoded {} file(s), {} failed, {} already modern, {} unreadable.",
        style(summary.results.len()).green().bold(),
        summary.failures.len(),
        summary.skipped_modern,
        summary.probe_failures
    );
    if !summary.results.is_empty() {
        let _ = writeln!(
            out,
            "Total size: {} -> {}",
            format_bytes(summary.total_input_bytes()),
            format_bytes(summary.total_output_bytes())
        );
    }
    if summary.cancelled {
        let _ = writeln!(out, "{}", style("Run cancelled before all files were processed.").yellow());
    }
    let _ = write!(out, "Working directory: {}", work_dir.display());
    out
}

/// Renders the file list produced by `--dry-run`.
pub fn render_dry_run(selected: &[std::path::PathBuf]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", section("Dry run"));
    for path in selected {
        let _ = writeln!(out, "{}", path.display());
    }
    let _ = write!(out, "{} file(s) would be transcoded.", selected.len());
    out
}
