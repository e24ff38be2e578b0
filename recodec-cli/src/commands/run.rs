//! Implementation of a `recodec` run.
//!
//! Bootstraps the working directory and logging, builds the core
//! configuration from the arguments, wires the event handlers and shutdown
//! signals, and hands control to the core pipeline.

use crate::cli::Cli;
use crate::config::{create_core_config, resolve_work_dir};
use crate::logging::level_for;
use crate::signals::install_shutdown_handler;
use crate::terminal::{ProgressBarHandler, render_dry_run, render_summary};

use anyhow::{Context, Result};
use log::{debug, info};
use recodec_core::events::json_handler::JsonEventHandler;
use recodec_core::events::log_handler::LogEventHandler;
use recodec_core::external::{
    CrateFfprobeExecutor, SidecarSpawner, StdFsMetadataProvider, check_dependency,
};
use recodec_core::logging::init_logging;
use recodec_core::{CancellationToken, EventDispatcher, Pipeline};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Creates the working directory for this run and returns its path.
pub fn bootstrap_work_dir(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let work_dir = resolve_work_dir(cli, &cwd);
    fs::create_dir_all(&work_dir).with_context(|| {
        format!("Failed to create working directory '{}'", work_dir.display())
    })?;
    Ok(work_dir)
}

fn build_dispatcher(cli: &Cli) -> EventDispatcher {
    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(LogEventHandler::new()));
    if cli.json {
        events.add_handler(Arc::new(JsonEventHandler::new()));
    } else {
        events.add_handler(Arc::new(ProgressBarHandler::new()));
    }
    events
}

/// Runs the pipeline (or a dry run) described by `cli`.
///
/// Any error returned here means the run failed; cancellation is not an error.
pub fn run(cli: &Cli) -> Result<()> {
    let started = Instant::now();

    let work_dir = bootstrap_work_dir(cli)?;
    init_logging(&work_dir, level_for(cli.verbose))?;
    info!("Working directory: {}", work_dir.display());

    let config = create_core_config(cli, work_dir.clone());
    config.validate()?;
    debug!("Core configuration: {:?}", config);

    check_dependency("ffprobe").context("ffprobe is required to inspect video files")?;
    if !cli.dry_run {
        check_dependency("ffmpeg").context("ffmpeg is required to transcode video files")?;
    }

    let events = build_dispatcher(cli);
    let prober = CrateFfprobeExecutor::new();
    let spawner = SidecarSpawner;
    let metadata = StdFsMetadataProvider;

    let cancel = CancellationToken::new();
    install_shutdown_handler(cancel.clone())?;
    let pipeline =
        Pipeline::new(&config, &prober, &spawner, &metadata, &events).with_cancellation(cancel);

    if cli.dry_run {
        let selected = pipeline.dry_run()?;
        info!("Dry run selected {} file(s)", selected.len());
        if !cli.json {
            println!("{}", render_dry_run(&selected));
        }
        return Ok(());
    }

    let summary = pipeline.run()?;
    info!(
        "Run finished in {}",
        recodec_core::format_duration(started.elapsed().as_secs_f64())
    );
    if !cli.json {
        println!("{}", render_summary(&summary, &work_dir));
    }
    Ok(())
}
