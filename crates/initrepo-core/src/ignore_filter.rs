//! Gitignore-based exclusion for a single rename pass.
//!
//! Each target folder carries its own `.gitignore`; paths handed to
//! [`IgnoreFilter::is_ignored`] are relative to that folder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;

use crate::ScaffoldError;

pub const IGNORE_FILE: &str = ".gitignore";

pub struct IgnoreFilter {
    matcher: Gitignore,
    source: PathBuf,
}

impl IgnoreFilter {
    /// Loads `<root>/.gitignore`. A missing file is an error, not an empty filter.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_file(&root.join(IGNORE_FILE))
    }

    pub fn load_file(ignore_file: &Path) -> Result<Self> {
        let contents = fs::read_to_string(ignore_file).map_err(|e| ScaffoldError::IgnoreFile {
            path: ignore_file.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(ignore_file, &contents)
    }

    /// Builds a filter from raw gitignore text. `source` is only used in messages.
    pub fn parse(source: &Path, contents: &str) -> Result<Self> {
        // Rooted at "." so that relative paths are matched as given; the target
        // folder gets renamed while the filter is alive.
        let mut builder = GitignoreBuilder::new(".");
        for line in contents.lines() {
            builder.add_line(None, line).map_err(|e| ScaffoldError::IgnoreFile {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let matcher = builder.build().map_err(|e| ScaffoldError::IgnoreFile {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!("Loaded {} ignore rules from {:?}", matcher.num_ignores(), source);

        Ok(Self {
            matcher,
            source: source.to_path_buf(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(relative_path, is_dir).is_ignore()
    }
}
