/// Module for error handling
pub mod error;
/// Module for duration labels and file name cleanup
pub mod naming;
/// Module for probing media durations
pub mod probe;

use crate::error::Error;
use crate::naming::{format_duration_label, sanitize_stem};
use crate::probe::DurationSource;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use strum_macros::Display;
use walkdir::WalkDir;

/// Represents supported video file formats
#[derive(Debug, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Mov,
    Avi,
    Mkv,
    Wmv,
    Flv,
    Webm,
}

impl VideoFormat {
    /// Creates a VideoFormat from a file path based on its extension, ignoring case
    #[inline]
    pub fn from_path(value: impl AsRef<Path>) -> Option<Self> {
        Some(
            match value
                .as_ref()
                .extension()?
                .to_string_lossy()
                .to_lowercase()
                .as_ref()
            {
                "mp4" => Self::Mp4,
                "mov" => Self::Mov,
                "avi" => Self::Avi,
                "mkv" => Self::Mkv,
                "wmv" => Self::Wmv,
                "flv" => Self::Flv,
                "webm" => Self::Webm,
                _ => return None,
            },
        )
    }
}

/// Configuration for one tagging run
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// A single video file, or a directory whose videos should be tagged
    pub path: PathBuf,
    /// Descend into subdirectories when `path` is a directory
    pub recursive: bool,
    /// Report what would be renamed without touching the filesystem
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        RenameOptions {
            path: PathBuf::from("."),
            recursive: false,
            dry_run: false,
        }
    }
}

/// A pending rename from a video's current path to its tagged path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RenamePlan {
    /// Builds `<sanitized stem>_<label>.<ext>` next to `path`. The extension keeps
    /// its original case.
    pub fn new(path: impl AsRef<Path>, duration_secs: f64) -> Result<Self, Error> {
        let path = path.as_ref();
        let invalid = || Error::InvalidFileName {
            path: path.to_path_buf(),
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?;
        let extension = path
            .extension()
            .map(|e| e.to_str().ok_or_else(invalid))
            .transpose()?;

        let mut name = format!(
            "{}_{}",
            sanitize_stem(stem),
            format_duration_label(duration_secs)
        );
        if let Some(ext) = extension {
            name.push('.');
            name.push_str(ext);
        }
        Ok(Self {
            from: path.to_path_buf(),
            to: path.with_file_name(name),
        })
    }
}

/// Per-file outcome, reported as soon as it happens
#[derive(Debug)]
pub enum RenameEvent {
    Renamed(RenamePlan),
    /// Dry run only
    Planned(RenamePlan),
    /// The file already carries the right tag
    Unchanged(PathBuf),
    /// Probing, renaming or reading a subdirectory failed; the walk went on
    Failed { path: PathBuf, error: Error },
}

/// Counts for a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenameSummary {
    pub renamed: usize,
    pub unchanged: usize,
    /// Files ignored because they are not videos
    pub skipped: usize,
    pub failed: usize,
}

impl RenameSummary {
    fn record(&mut self, event: &RenameEvent) {
        match event {
            RenameEvent::Renamed(_) | RenameEvent::Planned(_) => self.renamed += 1,
            RenameEvent::Unchanged(_) => self.unchanged += 1,
            RenameEvent::Failed { .. } => self.failed += 1,
        }
    }
}

/// Tags a single video or every video in a directory with its duration.
///
/// For a single file any failure is returned. For a directory, failures of
/// individual files and subdirectories are reported through `on_event` and the
/// walk continues; only an inaccessible or unreadable root is returned as an
/// error.
pub fn tag_path<S, F>(
    options: &RenameOptions,
    source: &S,
    on_event: &mut F,
) -> Result<RenameSummary, Error>
where
    S: DurationSource + ?Sized,
    F: FnMut(RenameEvent),
{
    let root = &options.path;
    let metadata = fs::metadata(root).map_err(|e| Error::PathAccess {
        path: root.clone(),
        source: e,
    })?;

    let mut summary = RenameSummary::default();
    if metadata.is_dir() {
        info!(
            "Tagging videos in {:?}{}",
            root,
            if options.recursive { " recursively" } else { "" }
        );
        tag_directory(root, options, source, on_event, &mut summary)?;
    } else {
        let event = tag_file(root, source, options.dry_run)?;
        report(event, &mut summary, on_event);
    }
    Ok(summary)
}

/// Probes, plans and renames one explicitly named file.
pub fn tag_file<S>(path: impl AsRef<Path>, source: &S, dry_run: bool) -> Result<RenameEvent, Error>
where
    S: DurationSource + ?Sized,
{
    let path = path.as_ref();
    if !path.is_file() || VideoFormat::from_path(path).is_none() {
        return Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    tag_video(path, source, dry_run)
}

fn tag_video<S>(path: &Path, source: &S, dry_run: bool) -> Result<RenameEvent, Error>
where
    S: DurationSource + ?Sized,
{
    let duration = source.duration_secs(path)?;
    let plan = RenamePlan::new(path, duration)?;
    debug!("Plan: {:?} -> {:?}", plan.from, plan.to);
    apply_plan(plan, dry_run)
}

fn apply_plan(plan: RenamePlan, dry_run: bool) -> Result<RenameEvent, Error> {
    if plan.from == plan.to {
        debug!("Already tagged: {:?}", plan.from);
        return Ok(RenameEvent::Unchanged(plan.from));
    }
    if dry_run {
        return Ok(RenameEvent::Planned(plan));
    }
    // fs::rename silently replaces an existing file on Unix
    if fs::symlink_metadata(&plan.to).is_ok() {
        return Err(Error::Rename {
            source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            from: plan.from,
            to: plan.to,
        });
    }
    if let Err(e) = fs::rename(&plan.from, &plan.to) {
        return Err(Error::Rename {
            from: plan.from,
            to: plan.to,
            source: e,
        });
    }
    Ok(RenameEvent::Renamed(plan))
}

fn tag_directory<S, F>(
    dir: &Path,
    options: &RenameOptions,
    source: &S,
    on_event: &mut F,
    summary: &mut RenameSummary,
) -> Result<(), Error>
where
    S: DurationSource + ?Sized,
    F: FnMut(RenameEvent),
{
    // Sorting makes walkdir read the whole listing up front, so files renamed
    // below are never listed a second time.
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::DirectoryRead {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let error = Error::DirectoryRead {
                    path: path.clone(),
                    source: e,
                };
                report(RenameEvent::Failed { path, error }, summary, on_event);
                continue;
            }
        };
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if !options.recursive {
                debug!("Skipping directory {:?}", path);
                continue;
            }
            if let Err(error) = tag_directory(path, options, source, on_event, summary) {
                report(
                    RenameEvent::Failed {
                        path: path.to_path_buf(),
                        error,
                    },
                    summary,
                    on_event,
                );
            }
            continue;
        }

        // symlinks count as files only when they point at one
        if !(file_type.is_file() || (file_type.is_symlink() && path.is_file())) {
            continue;
        }
        if VideoFormat::from_path(path).is_none() {
            summary.skipped += 1;
            continue;
        }

        match tag_video(path, source, options.dry_run) {
            Ok(event) => report(event, summary, on_event),
            Err(error) => report(
                RenameEvent::Failed {
                    path: path.to_path_buf(),
                    error,
                },
                summary,
                on_event,
            ),
        }
    }
    Ok(())
}

fn report<F: FnMut(RenameEvent)>(
    event: RenameEvent,
    summary: &mut RenameSummary,
    on_event: &mut F,
) {
    summary.record(&event);
    on_event(event);
}
