use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod ignore_filter;
pub mod naming;
pub mod references;
pub mod templater;
pub mod tree;

pub use ignore_filter::{IgnoreFilter, IGNORE_FILE};
pub use naming::{to_pascal_like_name, to_title_like_name, CaseStyle, ProjectName};
pub use references::{rewrite_references, ReferenceRewrite, REFERENCE_FILES};
pub use templater::{
    substitute_file_contents, substitute_in_file, write_atomically, ContentOutcome, ExactTemplater, TemplateOptions,
};
pub use tree::{rename_tree, ApproveAll, ChangeReview, EntryKind, RenamePass, RenameSummary};

use tree::RenameClaims;

/// Substring identifying the API folder among the workspace's top-level entries.
pub const API_FOLDER_MARKER: &str = "Api";
/// Substring identifying the frontend folder.
pub const FRONTEND_FOLDER_MARKER: &str = "frontend";

#[derive(thiserror::Error, Debug)]
pub enum ScaffoldError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No {kind} folder found in {workspace:?}")]
    MissingFolder { kind: &'static str, workspace: PathBuf },
    #[error("Ignore file {path:?} could not be loaded: {message}")]
    IgnoreFile { path: PathBuf, message: String },
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },
    #[error("Cannot rename {from:?} to {to:?}: destination already exists")]
    RenameConflict { from: PathBuf, to: PathBuf },
    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub struct ScaffoldConfig {
    pub workspace: PathBuf,
    pub project_name: ProjectName,
    pub api_template: String,
    pub frontend_template: String,
    pub dry_run: bool,
    pub rewrite_references: bool,
}

/// Names of the two template folders found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFolders {
    pub api: String,
    pub frontend: String,
}

pub struct ScaffoldReport {
    pub api_root: PathBuf,
    pub frontend_root: PathBuf,
    pub api: RenameSummary,
    pub frontend: RenameSummary,
    pub references_rewritten: usize,
}

impl ScaffoldReport {
    pub fn total(&self) -> RenameSummary {
        let mut total = self.api.clone();
        total.absorb(&self.frontend);
        total
    }
}

pub fn resolve_target_folders(workspace: &Path) -> Result<TargetFolders> {
    let mut names = Vec::new();
    for entry in fs::read_dir(workspace)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    debug!("Top-level folders in {:?}: {:?}", workspace, names);

    let api = find_folder(&names, API_FOLDER_MARKER, "API", workspace)?;
    let frontend = find_folder(&names, FRONTEND_FOLDER_MARKER, "frontend", workspace)?;

    Ok(TargetFolders { api, frontend })
}

fn find_folder(names: &[String], marker: &str, kind: &'static str, workspace: &Path) -> Result<String> {
    let mut candidates = names.iter().filter(|name| name.contains(marker));
    let Some(found) = candidates.next() else {
        return Err(ScaffoldError::MissingFolder {
            kind,
            workspace: workspace.to_path_buf(),
        }
        .into());
    };

    let others: Vec<&String> = candidates.collect();
    if !others.is_empty() {
        warn!("Several {} folders found, using '{}' and leaving {:?}", kind, found, others);
    }

    Ok(found.clone())
}

/// Renames both template folders and everything inside them to the project name.
///
/// Steps run in order and the first failure aborts the rest; renames already
/// done stay on disk.
pub fn scaffold_workspace(config: &ScaffoldConfig, review: &dyn ChangeReview) -> Result<ScaffoldReport> {
    let workspace = &config.workspace;
    info!("Scaffolding workspace {:?} as '{}'", workspace, config.project_name);

    let folders = resolve_target_folders(workspace)?;
    info!("API folder: {}, frontend folder: {}", folders.api, folders.frontend);

    let api_ignore = IgnoreFilter::load(&workspace.join(&folders.api))?;
    let frontend_ignore = IgnoreFilter::load(&workspace.join(&folders.frontend))?;

    let options = || TemplateOptions {
        process_paths: true,
        process_contents: true,
        dry_run: config.dry_run,
    };

    let mut claims = RenameClaims::default();
    let api_folder_name = config.project_name.api_folder_name();
    let api_root = rename_root(workspace, &folders.api, &api_folder_name, config.dry_run, review, &mut claims)?;
    let api_name = CaseStyle::Pascal.apply(&config.project_name);
    let api_pass = RenamePass::new(&api_root, &config.api_template, &api_name, api_ignore).with_options(options());
    let api = rename_tree(&api_pass, review)?;

    let frontend_folder_name = config.project_name.frontend_folder_name();
    let frontend_root = rename_root(
        workspace,
        &folders.frontend,
        &frontend_folder_name,
        config.dry_run,
        review,
        &mut claims,
    )?;
    let frontend_name = CaseStyle::Title.apply(&config.project_name);
    let frontend_pass = RenamePass::new(&frontend_root, &config.frontend_template, &frontend_name, frontend_ignore)
        .with_options(options());
    let frontend = rename_tree(&frontend_pass, review)?;

    let references_rewritten = if config.rewrite_references {
        let rewrite = ReferenceRewrite {
            frontend_root: frontend_root.clone(),
            old_api_folder: folders.api.clone(),
            new_api_folder: api_folder_name,
            api_template: config.api_template.clone(),
            api_display_name: api_name,
        };
        rewrite_references(&rewrite, config.dry_run)?
    } else {
        0
    };

    let report = ScaffoldReport {
        api_root,
        frontend_root,
        api,
        frontend,
        references_rewritten,
    };

    let total = report.total();
    info!(
        "Scaffolding complete: {} files processed, {} paths renamed, {} content changes, {} entries ignored",
        total.files_processed, total.paths_renamed, total.content_changes, total.entries_ignored
    );

    Ok(report)
}

// Returns where the folder lives afterwards: the new path, or the old one for
// dry runs, declined renames and folders that already carry the new name.
fn rename_root(
    workspace: &Path,
    current: &str,
    new_name: &str,
    dry_run: bool,
    review: &dyn ChangeReview,
    claims: &mut RenameClaims,
) -> Result<PathBuf> {
    let from = workspace.join(current);
    if current == new_name {
        debug!("Folder {:?} already named '{}'", from, new_name);
        return Ok(from);
    }

    let to = workspace.join(new_name);
    if tree::rename_entry(&from, &to, EntryKind::Directory, dry_run, review, claims)? && !dry_run {
        Ok(to)
    } else {
        Ok(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    fn config(workspace: &Path) -> ScaffoldConfig {
        ScaffoldConfig {
            workspace: workspace.to_path_buf(),
            project_name: ProjectName::parse("animal-tracker").unwrap(),
            api_template: "CAP".to_string(),
            frontend_template: "React DAB!".to_string(),
            dry_run: false,
            rewrite_references: false,
        }
    }

    fn template_workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Api-template/.gitignore", "*.log\nbin/\n");
        write(root, "Api-template/CAP.API/appsettings.json", r#""Name": "CAP""#);
        write(root, "Api-template/CAP.API/CAP.API.csproj", "<AssemblyName>CAP.API</AssemblyName>");
        write(root, "Api-template/debug.CAP.log", "CAP");
        write(root, "Api-template/bin/CAP.dll", "CAP");
        write(root, "frontend-react/.gitignore", "node_modules/\n");
        write(root, "frontend-react/index.html", "<title>React DAB!</title>");
        write(root, "frontend-react/node_modules/pkg/index.js", "React DAB!");
        write(
            root,
            "frontend-react/package.json",
            r#"{ "scripts": { "api": "dotnet run --project ../Api-template/CAP.API" } }"#,
        );
        write(root, "README.md", "CAP React DAB!");
        dir
    }

    #[test]
    fn test_resolve_target_folders() {
        let dir = template_workspace();
        let folders = resolve_target_folders(dir.path()).unwrap();
        assert_eq!(
            folders,
            TargetFolders {
                api: "Api-template".to_string(),
                frontend: "frontend-react".to_string(),
            }
        );
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("api-template")).unwrap();
        fs::create_dir(dir.path().join("frontend")).unwrap();

        let err = resolve_target_folders(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::MissingFolder { kind: "API", .. })
        ));
    }

    #[test]
    fn test_missing_frontend_folder() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("CAP.Api")).unwrap();
        fs::write(dir.path().join("frontend.txt"), "not a folder").unwrap();

        let err = resolve_target_folders(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::MissingFolder { kind: "frontend", .. })
        ));
    }

    #[test]
    fn test_scaffold_workspace() {
        let dir = template_workspace();
        let root = dir.path();

        let report = scaffold_workspace(&config(root), &ApproveAll).unwrap();

        assert_eq!(report.api_root, root.join("animal-tracker-api"));
        assert_eq!(report.frontend_root, root.join("animal-tracker"));
        assert!(!root.join("Api-template").exists());
        assert!(!root.join("frontend-react").exists());

        assert_eq!(
            read(root, "animal-tracker-api/AnimalTracker.API/appsettings.json"),
            r#""Name": "AnimalTracker""#
        );
        assert_eq!(
            read(root, "animal-tracker-api/AnimalTracker.API/AnimalTracker.API.csproj"),
            "<AssemblyName>AnimalTracker.API</AssemblyName>"
        );
        assert_eq!(read(root, "animal-tracker-api/debug.CAP.log"), "CAP");
        assert_eq!(read(root, "animal-tracker-api/bin/CAP.dll"), "CAP");

        assert_eq!(read(root, "animal-tracker/index.html"), "<title>Animal Tracker</title>");
        assert_eq!(read(root, "animal-tracker/node_modules/pkg/index.js"), "React DAB!");
        // Not rewritten unless requested.
        assert!(read(root, "animal-tracker/package.json").contains("../Api-template/CAP.API"));

        assert_eq!(read(root, "README.md"), "CAP React DAB!");
        assert_eq!(report.references_rewritten, 0);
        assert_eq!(report.api.entries_ignored, 2);
        assert_eq!(report.frontend.entries_ignored, 1);
    }

    #[test]
    fn test_scaffold_workspace_with_reference_rewrite() {
        let dir = template_workspace();
        let root = dir.path();
        let mut config = config(root);
        config.rewrite_references = true;

        let report = scaffold_workspace(&config, &ApproveAll).unwrap();

        assert_eq!(report.references_rewritten, 1);
        assert_eq!(
            read(root, "animal-tracker/package.json"),
            r#"{ "scripts": { "api": "dotnet run --project ../animal-tracker-api/AnimalTracker.API" } }"#
        );
    }

    #[test]
    fn test_scaffold_workspace_dry_run() {
        let dir = template_workspace();
        let root = dir.path();
        let mut config = config(root);
        config.dry_run = true;

        let report = scaffold_workspace(&config, &ApproveAll).unwrap();

        assert_eq!(report.api_root, root.join("Api-template"));
        assert_eq!(report.frontend_root, root.join("frontend-react"));
        assert_eq!(read(root, "Api-template/CAP.API/appsettings.json"), r#""Name": "CAP""#);
        assert_eq!(read(root, "frontend-react/index.html"), "<title>React DAB!</title>");
        assert!(report.total().paths_renamed > 0);
    }

    #[test]
    fn test_frontend_may_take_the_old_api_folder_name() {
        let dir = template_workspace();
        let root = dir.path();
        let mut config = config(root);
        config.project_name = ProjectName::parse("Api-template").unwrap();

        config.dry_run = true;
        let dry = scaffold_workspace(&config, &ApproveAll).unwrap();

        config.dry_run = false;
        let real = scaffold_workspace(&config, &ApproveAll).unwrap();

        assert_eq!(dry.total(), real.total());
        assert_eq!(real.frontend_root, root.join("Api-template"));
        assert_eq!(read(root, "Api-template/index.html"), "<title>Api Template</title>");
        assert_eq!(
            read(root, "Api-template-api/ApiTemplate.API/appsettings.json"),
            r#""Name": "ApiTemplate""#
        );
    }

    #[test]
    fn test_missing_ignore_file_aborts_before_renaming() {
        let dir = template_workspace();
        let root = dir.path();
        fs::remove_file(root.join("frontend-react/.gitignore")).unwrap();

        let err = scaffold_workspace(&config(root), &ApproveAll).err().unwrap();

        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::IgnoreFile { .. })
        ));
        assert!(root.join("Api-template").exists());
    }

    #[test]
    fn test_api_folder_carrying_template_token() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "CAP.Api/.gitignore", "");
        write(root, "CAP.Api/appsettings.json", r#""Name": "CAP""#);
        write(root, "frontend-react/.gitignore", "");
        write(root, "frontend-react/index.html", "<title>React DAB!</title>");

        scaffold_workspace(&config(root), &ApproveAll).unwrap();

        assert_eq!(
            read(root, "animal-tracker-api/appsettings.json"),
            r#""Name": "AnimalTracker""#
        );
        assert_eq!(read(root, "animal-tracker/index.html"), "<title>Animal Tracker</title>");
    }
}
