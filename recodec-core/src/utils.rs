//! Utility functions for path manipulation, formatting and size statistics.
//!
//! This module provides general-purpose helpers used throughout the
//! recodec-core library and by the CLI summary output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Replaces the final extension of `path` with `new_ext`.
///
/// A leading dot on `new_ext` is optional. A path without an extension gets
/// one appended, and only the last suffix is replaced, so
/// `video.old.avi` becomes `video.old.mp4`. Applying the same extension twice
/// yields the same path.
///
/// # Examples
///
/// ```rust
/// use recodec_core::utils::change_extension;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(change_extension(Path::new("/a/b/video.avi"), ".mp4"), PathBuf::from("/a/b/video.mp4"));
/// assert_eq!(change_extension(Path::new("video"), "mp4"), PathBuf::from("video.mp4"));
/// ```
#[must_use]
pub fn change_extension(path: &Path, new_ext: &str) -> PathBuf {
    let ext = new_ext.strip_prefix('.').unwrap_or(new_ext);

    let stem: OsString = match path.file_stem() {
        Some(stem) => stem.to_os_string(),
        None => return path.to_path_buf(),
    };

    let mut file_name = stem;
    if !ext.is_empty() {
        file_name.push(".");
        file_name.push(ext);
    }

    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

/// Output size as an integer percentage of the input size, truncated.
/// Returns 0 when the input is empty.
#[must_use]
pub fn calculate_transcode_ratio(input_size: u64, output_size: u64) -> u64 {
    if input_size == 0 {
        return 0;
    }
    ((u128::from(output_size) * 100) / u128::from(input_size)) as u64
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}
