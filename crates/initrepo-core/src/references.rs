//! Post-processing for frontend configuration files that point at the API.
//!
//! The frontend's `package.json` scripts and the OpenAPI client generator
//! config refer to the API by its folder name and by its `<Name>.API` project
//! name. Both change when the API is renamed, but the frontend pass only
//! replaces the frontend token, so these references are rewritten separately.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::templater::{write_atomically, ExactTemplater};

pub const REFERENCE_FILES: [&str; 2] = ["package.json", "openapi-ts.config.ts"];

const API_PROJECT_SUFFIX: &str = ".API";

pub struct ReferenceRewrite {
    pub frontend_root: PathBuf,
    pub old_api_folder: String,
    pub new_api_folder: String,
    pub api_template: String,
    pub api_display_name: String,
}

impl ReferenceRewrite {
    fn project_templater(&self) -> ExactTemplater {
        ExactTemplater::new(
            &format!("{}{}", self.api_template, API_PROJECT_SUFFIX),
            &format!("{}{}", self.api_display_name, API_PROJECT_SUFFIX),
        )
    }

    /// Folder name first, then the project name.
    pub fn apply(&self, content: &str) -> Option<String> {
        let folders = replace_path_segment(content, &self.old_api_folder, &self.new_api_folder);
        let current = folders.as_deref().unwrap_or(content);
        match self.project_templater().process_content(current) {
            Some(rewritten) => Some(rewritten),
            None => folders,
        }
    }
}

// Replaces `old` only where it stands as a whole path segment next to a
// separator, as in `../Api-template/` or `../Api-template"`.
fn replace_path_segment(content: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() || old == new {
        return None;
    }

    let is_separator = |c: Option<char>| matches!(c, Some('/') | Some('\\'));
    let is_name_char = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    let mut output = String::with_capacity(content.len());
    let mut last = 0;
    for (start, _) in content.match_indices(old) {
        let end = start + old.len();
        let before = content[..start].chars().next_back();
        let after = content[end..].chars().next();
        let segment = (is_separator(before) && !is_name_char(after)) || (is_separator(after) && !is_name_char(before));
        if segment {
            output.push_str(&content[last..start]);
            output.push_str(new);
            last = end;
        }
    }

    if last == 0 {
        return None;
    }
    output.push_str(&content[last..]);
    debug!("Folder reference replacement: '{}' -> '{}'", old, new);
    Some(output)
}

/// Rewrites API references in the frontend's reference files.
///
/// Returns the number of files changed. Missing files are skipped.
pub fn rewrite_references(rewrite: &ReferenceRewrite, dry_run: bool) -> Result<usize> {
    let mut changed = 0;

    for file_name in REFERENCE_FILES {
        let path = rewrite.frontend_root.join(file_name);
        if !path.is_file() {
            warn!("No {} in {:?}, skipping reference rewrite", file_name, rewrite.frontend_root);
            continue;
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let Some(new_content) = rewrite.apply(&content) else {
            debug!("No API references in {:?}", path);
            continue;
        };

        if dry_run {
            info!("Would rewrite API references in: {:?}", path);
        } else {
            info!("Rewriting API references in: {:?}", path);
            write_atomically(&path, &new_content).with_context(|| format!("Failed to write {:?}", path))?;
        }
        changed += 1;
    }

    Ok(changed)
}
