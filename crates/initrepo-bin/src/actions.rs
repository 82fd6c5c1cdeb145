//! Glue for running as a GitHub Action step versus locally.

use anyhow::Result;
use initrepo_core::ScaffoldError;
use std::ffi::OsString;

pub const DEFAULT_NAME: &str = "animal-tracker";
pub const DEFAULT_API_TEMPLATE: &str = "CAP";
pub const DEFAULT_FRONTEND_TEMPLATE: &str = "React DAB!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Running as a workflow step; inputs are mandatory.
    Actions,
    /// Running by hand; absent inputs fall back to the defaults above.
    Local,
}

impl RunMode {
    pub fn detect() -> Self {
        Self::from_env_value(std::env::var_os("GITHUB_ACTIONS"))
    }

    pub fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(value) if !value.is_empty() => RunMode::Actions,
            _ => RunMode::Local,
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionInputs {
    pub name: Option<String>,
    pub api_template: Option<String>,
    pub frontend_template: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedInputs {
    pub name: String,
    pub api_template: String,
    pub frontend_template: String,
}

impl ActionInputs {
    pub fn resolve(self, mode: RunMode) -> Result<ResolvedInputs> {
        Ok(ResolvedInputs {
            name: resolve_input("name-to-replace-with", self.name, DEFAULT_NAME, mode)?,
            api_template: resolve_input("api-template-name", self.api_template, DEFAULT_API_TEMPLATE, mode)?,
            frontend_template: resolve_input(
                "frontend-template-name",
                self.frontend_template,
                DEFAULT_FRONTEND_TEMPLATE,
                mode,
            )?,
        })
    }
}

// The runner passes unset inputs as empty strings.
fn resolve_input(input: &str, value: Option<String>, default: &str, mode: RunMode) -> Result<String> {
    match (value.filter(|v| !v.trim().is_empty()), mode) {
        (Some(value), _) => Ok(value),
        (None, RunMode::Local) => Ok(default.to_string()),
        (None, RunMode::Actions) => Err(ScaffoldError::Config {
            message: format!("Input required and not supplied: {}", input),
        }
        .into()),
    }
}

/// Formats a failure as an `::error::` workflow command.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
