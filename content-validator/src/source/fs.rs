//! Filesystem source.
//!
//! Reads project documents safely for the validation pipeline:
//! - Paths taken from configuration are confined to the project root
//! - Bounded streaming reads prevent TOCTOU and memory `DoS`
//! - Directory walks do not follow symlinks and are depth-limited
//!
//! All paths handed out by this module are relative to the project root so
//! that findings read the same regardless of where the tool is invoked.

use std::io::{ErrorKind, Read};
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use serde_json::Value;
use walkdir::WalkDir;

use crate::config::ValidationConfig;
use crate::error::{SourceError, SourceErrorKind};

/// Directories to skip during the sweep.
pub const SKIP_DIRS: &[&str] = &["node_modules", ".git", "backup", "backups"];

/// Maximum directory depth for the sweep.
pub const MAX_SWEEP_DEPTH: usize = 16;

/// Normalize a configured path and confine it to the project root.
///
/// Returns `None` for empty paths, absolute paths, and paths with `..`
/// components. `.` components are dropped, so `./data/a.json` and
/// `data/a.json` normalize to the same value.
#[must_use]
pub fn confine(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if normalized.as_os_str().is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Read a project file using a bounded streaming read, enforcing `max_file_size`.
///
/// `relative` is resolved against `config.root`; errors carry `relative`.
///
/// # Errors
///
/// Returns a `SourceError` if the file is missing, unreadable, larger than
/// `max_file_size`, or not valid UTF-8.
pub fn read_file_bounded(
    config: &ValidationConfig,
    relative: &Path,
) -> Result<String, SourceError> {
    let max_file_size = config.max_file_size;
    let file = std::fs::File::open(config.resolve(relative)).map_err(|e| {
        let kind = if e.kind() == ErrorKind::NotFound {
            SourceErrorKind::Missing
        } else {
            SourceErrorKind::IoError
        };
        SourceError::new(relative, kind, format!("Failed to open file: {e}"))
    })?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|e| {
            SourceError::new(
                relative,
                SourceErrorKind::IoError,
                format!("Failed to read file: {e}"),
            )
        })?;

    if buffer.len() as u64 > max_file_size {
        return Err(SourceError::new(
            relative,
            SourceErrorKind::FileTooLarge,
            format!("File exceeds maximum size of {max_file_size} bytes"),
        ));
    }

    String::from_utf8(buffer).map_err(|_| {
        SourceError::new(
            relative,
            SourceErrorKind::InvalidEncoding,
            "File is not valid UTF-8".to_owned(),
        )
    })
}

/// Read and parse a project JSON document.
///
/// # Errors
///
/// Returns a `SourceError` if the file cannot be read (see
/// [`read_file_bounded`]) or is not valid JSON.
pub fn read_json(config: &ValidationConfig, relative: &Path) -> Result<Value, SourceError> {
    let content = read_file_bounded(config, relative)?;
    tracing::debug!(file = %relative.display(), bytes = content.len(), "loaded JSON document");
    serde_json::from_str(&content).map_err(|e| {
        SourceError::new(relative, SourceErrorKind::JsonParseError, e.to_string())
    })
}

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Returns `true` if the entry should be **included** (i.e., is NOT a skip dir).
fn is_not_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() > 0
        && entry.file_type().is_dir()
        && let Some(name) = entry.file_name().to_str()
    {
        return !SKIP_DIRS.contains(&name);
    }
    true
}

/// Compile the configured exclude globs. Invalid patterns are returned as
/// errors and otherwise ignored.
#[must_use]
pub fn compile_excludes(config: &ValidationConfig) -> (Vec<Pattern>, Vec<SourceError>) {
    let mut patterns = Vec::with_capacity(config.exclude.len());
    let mut errors = Vec::new();
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => patterns.push(pat),
            Err(e) => errors.push(SourceError::new(
                pat_str,
                SourceErrorKind::InvalidExcludePattern,
                format!("Invalid exclude glob pattern '{pat_str}': {e}"),
            )),
        }
    }
    (patterns, errors)
}

/// Find all `.json` files below `dir` (relative to the project root).
///
/// Returns `(files, errors)`:
/// - `files`: root-relative paths, sorted, that passed the exclude filters.
/// - `errors`: walk errors. These are never silently discarded.
///
/// A missing `dir` yields no files and no errors.
#[must_use]
pub fn find_json_files(
    config: &ValidationConfig,
    dir: &Path,
    exclude_patterns: &[Pattern],
) -> (Vec<PathBuf>, Vec<SourceError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    let walk_root = config.resolve(dir);
    if !walk_root.is_dir() {
        return (files, errors);
    }

    for entry_result in WalkDir::new(&walk_root)
        .follow_links(false)
        .max_depth(MAX_SWEEP_DEPTH)
        .into_iter()
        .filter_entry(is_not_skip_dir)
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                let path = walk_err
                    .path()
                    .and_then(|p| p.strip_prefix(&config.root).ok())
                    .map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                errors.push(SourceError::new(
                    path,
                    SourceErrorKind::WalkError,
                    format!("Directory traversal error: {walk_err}"),
                ));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(&config.root) else {
            continue;
        };

        if relative.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        if matches_exclude(relative, exclude_patterns) {
            continue;
        }

        if let Some(normalized) = confine(relative) {
            files.push(normalized);
        }
    }

    files.sort();
    files.dedup();
    (files, errors)
}
