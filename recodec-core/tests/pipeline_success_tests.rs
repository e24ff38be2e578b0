// recodec-core/tests/pipeline_success_tests.rs
#![cfg(unix)]

use ffmpeg_sidecar::event::{FfmpegDuration, FfmpegEvent};
use recodec_core::config::{CoreConfig, CoreConfigBuilder, StreamSelectionPolicy};
use recodec_core::events::{Event, EventDispatcher};
use recodec_core::external::StdFsMetadataProvider;
use recodec_core::external::mocks::{
    MockFfmpegSpawner, MockFfprobeExecutor, RecordingEventHandler, progress_event,
};
use recodec_core::inspect::StreamDescriptor;
use recodec_core::pipeline::Pipeline;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

// Helper to create a dummy file with some content
fn create_dummy_file(path: &Path, bytes: usize) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![7u8; bytes]).expect("Failed to create dummy file");
    path.to_path_buf()
}

fn config_for(src: &Path, work: &Path) -> CoreConfig {
    CoreConfigBuilder::new()
        .source_root(src.to_path_buf())
        .work_dir(work.to_path_buf())
        .build()
}

#[test]
fn test_pipeline_transcodes_legacy_file_into_mirrored_tree() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let work = tempdir()?;

    let input = create_dummy_file(&src.path().join("trips/2009/beach.avi"), 1000);
    let prober = MockFfprobeExecutor::new();
    prober.expect_streams(
        &input,
        vec![StreamDescriptor::video(0, "h264"), StreamDescriptor::audio(1, "aac")],
    );

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation(
        "beach.avi",
        vec![
            FfmpegEvent::ParsedDuration(FfmpegDuration {
                input_index: 0,
                duration: 10.0,
                raw_log_message: String::new(),
            }),
            progress_event("00:00:05.00", 2.0),
            progress_event("00:00:10.00", 2.0),
        ],
        Some(250),
    );

    let recorder = Arc::new(RecordingEventHandler::new());
    let mut events = EventDispatcher::new();
    events.add_handler(recorder.clone());

    let config = config_for(src.path(), work.path());
    let summary =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).run()?;

    // --- Summary ---
    assert!(!summary.cancelled);
    assert_eq!(summary.results.len(), 1);
    assert!(summary.failures.is_empty());
    let result = &summary.results[0];
    let expected_output = work.path().join("trips/2009/beach.mp4");
    assert_eq!(result.input_path, input);
    assert_eq!(result.output_path, expected_output);
    assert_eq!(result.input_size, 1000);
    assert_eq!(result.output_size, 250);
    assert_eq!(result.transcode_ratio, 25);
    assert!(expected_output.is_file());

    // --- ffmpeg arguments ---
    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 1);
    let args = &calls[0];
    let after = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    assert_eq!(after("-i").as_deref(), input.to_str());
    assert_eq!(after("-c:v").as_deref(), Some("libx265"));
    assert_eq!(after("-crf").as_deref(), Some("28"));
    assert_eq!(args.last().map(String::as_str), expected_output.to_str());

    // --- Event order ---
    let kinds: Vec<&'static str> = recorder
        .events()
        .iter()
        .map(|e| match e {
            Event::PipelineStarted { .. } => "started",
            Event::CodecDetected { .. } => "detected",
            Event::FileSelected { .. } => "selected",
            Event::TranscodeStarted { .. } => "transcode_started",
            Event::TranscodeProgress { .. } => "progress",
            Event::TranscodeCompleted { .. } => "completed",
            Event::PipelineFinished { .. } => "finished",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "started",
            "detected",
            "selected",
            "transcode_started",
            "progress",
            "progress",
            "completed",
            "finished"
        ]
    );

    let percents: Vec<f32> = recorder
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::TranscodeProgress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![50.0, 100.0]);
    Ok(())
}

#[test]
fn test_pipeline_skips_modern_and_unprobeable_files() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let work = tempdir()?;

    let legacy_a = create_dummy_file(&src.path().join("a/old.wmv"), 400);
    let legacy_b = create_dummy_file(&src.path().join("b/older.mov"), 800);
    let modern = create_dummy_file(&src.path().join("a/new.mkv"), 100);
    let broken = create_dummy_file(&src.path().join("b/broken.mp4"), 10);
    create_dummy_file(&src.path().join("a/readme.txt"), 10);

    let prober = MockFfprobeExecutor::new();
    prober.expect_streams(&legacy_a, vec![StreamDescriptor::video(0, "wmv3")]);
    prober.expect_streams(&legacy_b, vec![StreamDescriptor::video(0, "mpeg2video")]);
    prober.expect_streams(&modern, vec![StreamDescriptor::video(0, "hevc")]);
    prober.expect_failure(&broken, "Invalid data found when processing input");

    let spawner = MockFfmpegSpawner::with_default_success(200);
    let events = EventDispatcher::new();
    let config = config_for(src.path(), work.path());

    let summary =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).run()?;

    let mut outputs: Vec<PathBuf> = summary.results.iter().map(|r| r.output_path.clone()).collect();
    outputs.sort();
    assert_eq!(
        outputs,
        vec![work.path().join("a/old.mp4"), work.path().join("b/older.mp4")]
    );
    assert_eq!(summary.probed, 4);
    assert_eq!(summary.probe_failures, 1);
    assert_eq!(summary.skipped_modern, 1);
    assert_eq!(summary.total_input_bytes(), 1200);
    assert_eq!(summary.total_output_bytes(), 400);
    assert!(!work.path().join("a/new.mp4").exists());
    assert!(!work.path().join("b/broken.mp4").exists());
    assert_eq!(spawner.get_received_calls().len(), 2);
    Ok(())
}

#[test]
fn test_dry_run_lists_without_transcoding() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let work = tempdir()?;

    let legacy = create_dummy_file(&src.path().join("clip.avi"), 10);
    let modern = create_dummy_file(&src.path().join("clip2.mp4"), 10);

    let prober = MockFfprobeExecutor::new();
    prober.expect_streams(&legacy, vec![StreamDescriptor::video(0, "msmpeg4v3")]);
    prober.expect_streams(&modern, vec![StreamDescriptor::video(0, "av1")]);

    let spawner = MockFfmpegSpawner::new();
    let events = EventDispatcher::new();
    let config = config_for(src.path(), work.path());

    let selected =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).dry_run()?;

    assert_eq!(selected, vec![legacy]);
    assert!(spawner.get_received_calls().is_empty());
    assert_eq!(fs::read_dir(work.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_work_dir_inside_source_is_not_rediscovered() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let work = src.path().join("output-1");

    // An earlier run left an H.264 output inside the source tree.
    let input = create_dummy_file(&src.path().join("clip.avi"), 100);
    let earlier_output = create_dummy_file(&work.join("clip.mp4"), 50);

    let prober = MockFfprobeExecutor::new();
    prober.expect_streams(&input, vec![StreamDescriptor::video(0, "mpeg4")]);
    prober.expect_streams(&earlier_output, vec![StreamDescriptor::video(0, "h264")]);

    let spawner = MockFfmpegSpawner::with_default_success(40);
    let events = EventDispatcher::new();
    let config = config_for(src.path(), &work);

    let summary =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).run()?;

    assert_eq!(prober.calls(), vec![input.clone()]);
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].output_path, work.join("clip.mp4"));
    assert!(!work.join("output-1").exists());

    let selected =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).dry_run()?;
    assert_eq!(selected, vec![input]);
    Ok(())
}

#[test]
fn test_once_per_stream_transcodes_file_for_each_legacy_stream() -> Result<(), Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let work = tempdir()?;

    let input = create_dummy_file(&src.path().join("multi.mkv"), 600);
    let prober = MockFfprobeExecutor::new();
    prober.expect_streams(
        &input,
        vec![
            StreamDescriptor::video(0, "h264"),
            StreamDescriptor::audio(1, "ac3"),
            StreamDescriptor::video(2, "mpeg2video"),
            StreamDescriptor::video(3, "hevc"),
        ],
    );

    let spawner = MockFfmpegSpawner::with_default_success(150);
    let events = EventDispatcher::new();
    let config = CoreConfigBuilder::new()
        .source_root(src.path().to_path_buf())
        .work_dir(work.path().to_path_buf())
        .stream_policy(StreamSelectionPolicy::OncePerStream)
        .build();

    let summary =
        Pipeline::new(&config, &prober, &spawner, &StdFsMetadataProvider, &events).run()?;

    // Two legacy video streams: the same input is encoded twice onto the same output.
    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(summary.results.len(), 2);
    let expected_output = work.path().join("multi.mp4");
    assert!(summary.results.iter().all(|r| r.input_path == input));
    assert!(summary.results.iter().all(|r| r.output_path == expected_output));
    assert_eq!(summary.total_input_bytes(), 1200);
    assert_eq!(summary.probed, 1);
    assert_eq!(prober.calls().len(), 1);
    Ok(())
}
