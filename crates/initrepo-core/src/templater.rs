use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::tree::{ApproveAll, ChangeReview};

/// Literal token replacement for file names and file contents.
///
/// The token is never interpreted as a pattern: `CAP.API` only matches the
/// exact text `CAP.API`.
#[derive(Debug, Clone)]
pub struct ExactTemplater {
    token: String,
    replacement: String,
}

pub struct TemplateOptions {
    pub process_paths: bool,
    pub process_contents: bool,
    pub dry_run: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            process_paths: true,
            process_contents: true,
            dry_run: false,
        }
    }
}

impl ExactTemplater {
    pub fn new(token: &str, replacement: &str) -> Self {
        Self {
            token: token.to_string(),
            replacement: replacement.to_string(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn is_noop(&self) -> bool {
        self.token.is_empty() || self.token == self.replacement
    }

    /// Returns the rewritten text, or `None` when the token does not occur.
    pub fn process_content(&self, content: &str) -> Option<String> {
        if self.is_noop() || !content.contains(&self.token) {
            return None;
        }
        debug!(
            "Content replacement: found {} occurrences of '{}'",
            content.matches(&self.token).count(),
            self.token
        );
        Some(content.replace(&self.token, &self.replacement))
    }

    /// Rewrites a single path component (a base name, not a full path).
    pub fn process_name(&self, name: &str) -> Option<String> {
        let new_name = self.process_content(name)?;
        debug!("Name replacement: '{}' -> '{}'", name, new_name);
        Some(new_name)
    }
}

/// What became of one file's contents after substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOutcome {
    /// The token was replaced (or would be, in a dry run).
    Rewritten,
    /// The token does not occur in the file.
    Unchanged,
    /// The review turned the change down.
    Declined,
    /// The file is not valid UTF-8 and was left alone.
    NotText,
}

/// Replaces every occurrence of `token` in the file at `path` with `replacement`.
///
/// Returns whether the file changed. Files without the token and files that
/// are not UTF-8 text are left alone.
pub fn substitute_in_file(path: &Path, token: &str, replacement: &str) -> Result<bool> {
    let templater = ExactTemplater::new(token, replacement);
    let outcome = substitute_file_contents(path, &templater, false, &ApproveAll)?;
    Ok(outcome == ContentOutcome::Rewritten)
}

/// Rewrites the contents of one file through `templater`, asking `review`
/// first. Both the tree renamer and [`substitute_in_file`] go through here.
pub fn substitute_file_contents(
    path: &Path,
    templater: &ExactTemplater,
    dry_run: bool,
    review: &dyn ChangeReview,
) -> Result<ContentOutcome> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            debug!("Skipping non UTF-8 file: {:?}", path);
            return Ok(ContentOutcome::NotText);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {:?}", path)),
    };

    let Some(new_content) = templater.process_content(&content) else {
        return Ok(ContentOutcome::Unchanged);
    };

    if !review.approve_content(path, &content, &new_content)? {
        debug!("Content change declined: {:?}", path);
        return Ok(ContentOutcome::Declined);
    }

    if dry_run {
        info!("Would update contents of: {:?}", path);
    } else {
        info!("Updating contents of: {:?}", path);
        write_atomically(path, &new_content).with_context(|| format!("Failed to write {:?}", path))?;
    }

    Ok(ContentOutcome::Rewritten)
}

/// Writes `content` to a sibling temp file and renames it over `path`,
/// keeping the original file's permissions.
pub fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
