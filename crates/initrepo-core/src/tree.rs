use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::ignore_filter::IgnoreFilter;
use crate::templater::{substitute_file_contents, ContentOutcome, ExactTemplater, TemplateOptions};
use crate::ScaffoldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::Directory => "Directory",
            EntryKind::File => "File",
            EntryKind::Symlink => "Symlink",
        })
    }
}

/// Gatekeeper consulted before every content change and every rename.
pub trait ChangeReview {
    fn approve_content(&self, path: &Path, old_content: &str, new_content: &str) -> Result<bool>;

    fn approve_rename(&self, from: &Path, to: &Path, kind: EntryKind) -> Result<bool>;
}

/// Approves everything; used for non-interactive runs.
pub struct ApproveAll;

impl ChangeReview for ApproveAll {
    fn approve_content(&self, _path: &Path, _old: &str, _new: &str) -> Result<bool> {
        Ok(true)
    }

    fn approve_rename(&self, _from: &Path, _to: &Path, _kind: EntryKind) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameSummary {
    pub files_processed: usize,
    pub paths_renamed: usize,
    pub content_changes: usize,
    pub entries_ignored: usize,
}

impl RenameSummary {
    pub fn absorb(&mut self, other: &RenameSummary) {
        self.files_processed += other.files_processed;
        self.paths_renamed += other.paths_renamed;
        self.content_changes += other.content_changes;
        self.entries_ignored += other.entries_ignored;
    }
}

/// Everything one traversal needs, passed explicitly down the recursion.
pub struct RenamePass {
    pub root: PathBuf,
    pub templater: ExactTemplater,
    pub ignore: IgnoreFilter,
    pub options: TemplateOptions,
}

impl RenamePass {
    pub fn new(root: impl Into<PathBuf>, token: &str, replacement: &str, ignore: IgnoreFilter) -> Self {
        Self {
            root: root.into(),
            templater: ExactTemplater::new(token, replacement),
            ignore,
            options: TemplateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Targets already taken and sources already moved away within one directory.
///
/// A dry run leaves the disk untouched, so conflicts between siblings are
/// detected here instead of by looking at the filesystem alone.
#[derive(Debug, Default)]
pub(crate) struct RenameClaims {
    taken: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl RenameClaims {
    fn conflicts(&self, from: &Path, to: &Path) -> bool {
        if self.taken.contains(to) {
            return true;
        }
        if self.vacated.contains(to) {
            return false;
        }
        fs::symlink_metadata(to).is_ok() && !is_same_entry(from, to)
    }

    fn record(&mut self, from: &Path, to: &Path) {
        self.taken.remove(from);
        self.vacated.remove(to);
        self.vacated.insert(from.to_path_buf());
        self.taken.insert(to.to_path_buf());
    }
}

// A case-only rename on a case-insensitive filesystem finds `to` already
// present: it is the entry being renamed.
fn is_same_entry(from: &Path, to: &Path) -> bool {
    let case_variant = match (from.file_name(), to.file_name()) {
        (Some(a), Some(b)) => a != b && a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase(),
        _ => false,
    };
    case_variant && from.parent() == to.parent() && same_file_id(from, to)
}

#[cfg(unix)]
fn same_file_id(from: &Path, to: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::symlink_metadata(from), fs::symlink_metadata(to)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file_id(_from: &Path, to: &Path) -> bool {
    fs::symlink_metadata(to).is_ok()
}

/// Walks `pass.root`, rewriting file contents and renaming entries whose names
/// contain the token. Ignored entries are skipped along with everything below them.
pub fn rename_tree(pass: &RenamePass, review: &dyn ChangeReview) -> Result<RenameSummary> {
    info!(
        "Renaming under {:?}: '{}' -> '{}'",
        pass.root,
        pass.templater.token(),
        pass.templater.replacement()
    );

    let mut summary = RenameSummary::default();
    rename_directory(&pass.root, Path::new(""), pass, review, &mut summary)?;

    info!(
        "Pass complete: {} files processed, {} paths renamed, {} content changes, {} entries ignored",
        summary.files_processed, summary.paths_renamed, summary.content_changes, summary.entries_ignored
    );

    Ok(summary)
}

// `dir` is where the directory is on disk right now; `logical` is its path
// relative to the root as it reads after renaming. They differ in dry runs
// and when a rename was declined.
fn rename_directory(
    dir: &Path,
    logical: &Path,
    pass: &RenamePass,
    review: &dyn ChangeReview,
    summary: &mut RenameSummary,
) -> Result<()> {
    debug!("Processing directory: {:?}", dir);

    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {:?}", dir))?
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    let mut claims = RenameClaims::default();

    for entry in entries {
        let name = entry.file_name();
        let path = entry.path();
        let file_type = entry.file_type()?;
        let relative = logical.join(&name);

        if pass.ignore.is_ignored(&relative, file_type.is_dir()) {
            debug!("Ignoring {:?}", relative);
            summary.entries_ignored += 1;
            continue;
        }

        let new_name = if pass.options.process_paths {
            name.to_str().and_then(|n| pass.templater.process_name(n))
        } else {
            None
        };

        if file_type.is_dir() {
            let mut physical = path.clone();
            let mut child_logical = relative;
            if let Some(new_name) = new_name {
                let target = dir.join(&new_name);
                if rename_entry(&path, &target, EntryKind::Directory, pass.options.dry_run, review, &mut claims)? {
                    summary.paths_renamed += 1;
                    child_logical = logical.join(&new_name);
                    if !pass.options.dry_run {
                        physical = target;
                    }
                }
            }
            rename_directory(&physical, &child_logical, pass, review, summary)?;
        } else {
            let kind = if file_type.is_symlink() {
                debug!("Not following symlink: {:?}", path);
                EntryKind::Symlink
            } else {
                summary.files_processed += 1;
                if pass.options.process_contents {
                    let outcome = substitute_file_contents(&path, &pass.templater, pass.options.dry_run, review)?;
                    if outcome == ContentOutcome::Rewritten {
                        summary.content_changes += 1;
                    }
                }
                EntryKind::File
            };

            if let Some(new_name) = new_name {
                let target = dir.join(&new_name);
                if rename_entry(&path, &target, kind, pass.options.dry_run, review, &mut claims)? {
                    summary.paths_renamed += 1;
                }
            }
        }
    }

    Ok(())
}

/// Renames `from` to `to` after review. Returns whether the rename was approved.
///
/// An existing entry at `to`, or one an earlier rename in `claims` would have
/// put there, is never overwritten.
pub(crate) fn rename_entry(
    from: &Path,
    to: &Path,
    kind: EntryKind,
    dry_run: bool,
    review: &dyn ChangeReview,
    claims: &mut RenameClaims,
) -> Result<bool> {
    if claims.conflicts(from, to) {
        return Err(ScaffoldError::RenameConflict {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        }
        .into());
    }

    if !review.approve_rename(from, to, kind)? {
        debug!("Rename declined: {:?}", from);
        return Ok(false);
    }

    if dry_run {
        info!("Would rename {}: {:?} -> {:?}", kind, from, to);
    } else {
        info!("Renaming {}: {:?} -> {:?}", kind, from, to);
        fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))?;
    }
    claims.record(from, to);

    Ok(true)
}
