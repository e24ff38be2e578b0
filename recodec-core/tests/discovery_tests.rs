// recodec-core/tests/discovery_tests.rs

use recodec_core::discovery::{ExtensionSet, find_video_files};
use recodec_core::error::CoreError;
use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_find_video_files_at_any_depth() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("shows/season1/extras"))?;
    fs::create_dir_all(root.join("empty/nested"))?;

    // Five videos
    File::create(root.join("top.avi"))?;
    File::create(root.join("UPPER.MKV"))?;
    File::create(root.join("shows/pilot.mov"))?;
    File::create(root.join("shows/season1/ep1.mp4"))?;
    File::create(root.join("shows/season1/extras/blooper.wmv"))?;

    // Four non-videos
    File::create(root.join("notes.txt"))?;
    File::create(root.join("shows/poster.jpg"))?;
    File::create(root.join("shows/season1/ep1.srt"))?;
    File::create(root.join("shows/season1/extras/mkv"))?;

    let mut files: Vec<PathBuf> = find_video_files(root, &ExtensionSet::default())?
        .collect::<Result<_, _>>()?;
    files.sort();

    assert_eq!(files.len(), 5);
    assert!(files.iter().all(|p| p.is_absolute()));
    assert!(files.iter().all(|p| p.starts_with(root)));

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    for expected in ["top.avi", "UPPER.MKV", "pilot.mov", "ep1.mp4", "blooper.wmv"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }

    dir.close()?;
    Ok(())
}

#[test]
fn test_custom_extension_set() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("a.avi"))?;
    File::create(dir.path().join("b.mp4"))?;
    File::create(dir.path().join("c.ts"))?;

    let mut files: Vec<PathBuf> = find_video_files(dir.path(), &ExtensionSet::parse("ts,.AVI"))?
        .collect::<Result<_, _>>()?;
    files.sort();

    assert_eq!(files, vec![dir.path().join("a.avi"), dir.path().join("c.ts")]);
    Ok(())
}

#[test]
fn test_empty_tree_yields_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("readme.md"))?;
    fs::create_dir(dir.path().join("sub"))?;

    let mut files = find_video_files(dir.path(), &ExtensionSet::default())?;
    assert!(files.next().is_none());
    Ok(())
}

#[test]
fn test_missing_root_is_an_enumeration_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let missing = dir.path().join("surely_this_does_not_exist_42");

    let mut files = find_video_files(&missing, &ExtensionSet::default())?;
    match files.next() {
        Some(Err(CoreError::Enumeration { path, .. })) => assert_eq!(path, missing),
        other => panic!("expected enumeration error, got {other:?}"),
    }
    // Fused after the failure
    assert!(files.next().is_none());
    assert!(files.next().is_none());
    Ok(())
}

#[test]
fn test_relative_root_yields_absolute_paths() -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let dir = tempfile::Builder::new()
        .prefix("recodec-discovery-")
        .tempdir_in(&cwd)?;
    File::create(dir.path().join("clip.avi"))?;

    let relative = dir.path().strip_prefix(&cwd)?;
    let files: Vec<PathBuf> = find_video_files(relative, &ExtensionSet::default())?
        .collect::<Result<_, _>>()?;

    assert_eq!(files.len(), 1);
    assert!(files[0].is_absolute());
    assert!(files[0].ends_with("clip.avi"));
    Ok(())
}

#[test]
fn test_each_call_starts_a_fresh_walk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("one.avi"))?;

    let first: Vec<_> = find_video_files(dir.path(), &ExtensionSet::default())?.collect();
    File::create(dir.path().join("two.avi"))?;
    let second: Vec<_> = find_video_files(dir.path(), &ExtensionSet::default())?.collect();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    Ok(())
}

#[test]
fn test_excluded_directory_is_not_descended() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("output-1/nested"))?;
    File::create(root.join("keep.avi"))?;
    File::create(root.join("output-1/clip.mp4"))?;
    File::create(root.join("output-1/nested/other.mkv"))?;

    let files: Vec<PathBuf> = find_video_files(root, &ExtensionSet::default())?
        .excluding(&root.join("output-1"))?
        .collect::<Result<_, _>>()?;

    assert_eq!(files, vec![root.join("keep.avi")]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_ends_walk_with_one_error() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let dir = tempdir()?;
    let root = dir.path();
    let owner_check = root.join("owner-check");
    File::create(&owner_check)?;
    if fs::metadata(&owner_check)?.uid() == 0 {
        // Permission bits do not stop root from reading directories.
        eprintln!("skipping: running as root");
        return Ok(());
    }
    fs::remove_file(&owner_check)?;

    let readable = root.join("readable");
    let locked = root.join("locked");
    fs::create_dir_all(&readable)?;
    fs::create_dir_all(&locked)?;
    File::create(readable.join("a.avi"))?;
    File::create(readable.join("b.mkv"))?;
    File::create(locked.join("hidden.mp4"))?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    let mut files = find_video_files(root, &ExtensionSet::default())?;
    let items: Vec<_> = files.by_ref().collect();
    let after_end = files.next();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    let (last, before) = items.split_last().expect("at least the error item");
    match last {
        Err(CoreError::Enumeration { path, .. }) => assert_eq!(path, &locked),
        other => panic!("expected enumeration error last, got {other:?}"),
    }
    // Everything before the failure is a readable video; nothing from inside
    // the locked directory appears.
    for item in before {
        let path = item.as_ref().expect("only the final item is an error");
        assert!(path.starts_with(&readable), "unexpected {}", path.display());
    }
    assert!(after_end.is_none());
    Ok(())
}
