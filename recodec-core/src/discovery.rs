//! File discovery module for finding candidate video files.
//!
//! Discovery is lazy: [`find_video_files`] returns an iterator that walks the
//! source tree depth-first and reads directory entries only as the caller
//! pulls paths. A directory that cannot be read ends the walk with a single
//! [`CoreError::Enumeration`] item; the remainder of the tree is not silently
//! skipped. Directories registered with [`VideoFiles::excluding`] are never
//! descended into.

use crate::error::{CoreError, CoreResult};

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions recognised when no explicit set is configured.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv"];

/// Case-insensitive set of recognised video file extensions.
///
/// Entries are stored lower-case without the leading dot, so `".MKV"` and
/// `"mkv"` describe the same extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Builds a set from any list of extensions, with or without leading dots.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Parses a comma-separated list such as `".mp4, mkv,AVI"`.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true when the path's final extension is in the set.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_EXTENSIONS)
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.iter().map(|ext| format!(".{ext}")).collect();
        write!(f, "{}", joined.join(", "))
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

/// A directory pruned from the walk, matched lexically or through symlinks.
#[derive(Debug, Clone)]
struct ExcludedDir {
    absolute: PathBuf,
    canonical: Option<PathBuf>,
}

impl ExcludedDir {
    fn new(dir: &Path) -> CoreResult<Self> {
        let absolute = std::path::absolute(dir)?;
        let canonical = absolute.canonicalize().ok();
        Ok(Self { absolute, canonical })
    }

    fn matches(&self, dir: &Path) -> bool {
        if dir == self.absolute {
            return true;
        }
        let Some(canonical) = &self.canonical else {
            return false;
        };
        // Only resolve entries that could name the excluded directory.
        let name = dir.file_name();
        let candidate = name == self.absolute.file_name() || name == canonical.file_name();
        candidate && dir.canonicalize().is_ok_and(|resolved| &resolved == canonical)
    }
}

/// Lazy depth-first sequence of video file paths under a root directory.
///
/// Yields absolute paths in filesystem entry order. After the first
/// enumeration error the iterator is exhausted.
pub struct VideoFiles {
    walker: walkdir::IntoIter,
    extensions: ExtensionSet,
    excluded: Vec<ExcludedDir>,
    finished: bool,
}

impl VideoFiles {
    /// Prunes `dir` and everything beneath it from the walk.
    ///
    /// Used to keep the working directory out of discovery when it lives
    /// inside the source tree.
    pub fn excluding(mut self, dir: &Path) -> CoreResult<Self> {
        self.excluded.push(ExcludedDir::new(dir)?);
        Ok(self)
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        self.excluded.iter().any(|excluded| excluded.matches(dir))
    }
}

impl fmt::Debug for VideoFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFiles")
            .field("extensions", &self.extensions)
            .field("excluded", &self.excluded)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Iterator for VideoFiles {
    type Item = CoreResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.walker.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.finished = true;
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    return Some(Err(CoreError::Enumeration { path, source: err }));
                }
                Some(Ok(entry)) => {
                    if entry.file_type().is_dir() {
                        if self.is_excluded(entry.path()) {
                            log::debug!("Not descending into excluded {}", entry.path().display());
                            self.walker.skip_current_dir();
                        }
                        continue;
                    }
                    if self.extensions.matches(entry.path()) {
                        return Some(Ok(entry.into_path()));
                    }
                }
            }
        }
    }
}

impl std::iter::FusedIterator for VideoFiles {}

/// Starts a fresh lazy walk of `root` for files with a recognised extension.
///
/// The root is made absolute first so every yielded path is absolute. No
/// directory is read until the returned iterator is polled.
///
/// # Examples
///
/// ```rust,no_run
/// use recodec_core::discovery::{find_video_files, ExtensionSet};
/// use std::path::Path;
///
/// let files = find_video_files(Path::new("/path/to/videos"), &ExtensionSet::default()).unwrap();
/// for file in files {
///     match file {
///         Ok(path) => println!("{}", path.display()),
///         Err(e) => eprintln!("Error walking tree: {}", e),
///     }
/// }
/// ```
pub fn find_video_files(root: &Path, extensions: &ExtensionSet) -> CoreResult<VideoFiles> {
    let root = std::path::absolute(root).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to resolve source root '{}': {}",
            root.display(),
            e
        ))
    })?;

    log::debug!(
        "Walking {} for extensions {}",
        root.display(),
        extensions
    );

    Ok(VideoFiles {
        walker: WalkDir::new(root).follow_links(false).into_iter(),
        extensions: extensions.clone(),
        excluded: Vec::new(),
        finished: false,
    })
}
