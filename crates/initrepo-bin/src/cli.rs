use clap::{Parser, Subcommand, ValueEnum};
use initrepo_core::CaseStyle;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "initrepo")]
#[command(version)]
#[command(about = "Rename a freshly generated project to its real name")]
#[command(long_about = "Renames the API and frontend folders of a project generated from templates, along with every file name and file content carrying the template names, to the project's real name.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rename the API and frontend folders of a workspace")]
    Init {
        #[arg(long, env = "INPUT_NAME-TO-REPLACE-WITH", help = "Hyphenated project name (e.g., 'animal-tracker')")]
        name: Option<String>,

        #[arg(long, env = "INPUT_API-TEMPLATE-NAME", help = "Template name used throughout the API folder")]
        api_template: Option<String>,

        #[arg(long, env = "INPUT_FRONTEND-TEMPLATE-NAME", help = "Template name used throughout the frontend folder")]
        frontend_template: Option<String>,

        #[arg(long, env = "GITHUB_WORKSPACE", help = "Workspace root (defaults to current directory)")]
        workspace: Option<PathBuf>,

        #[arg(long, help = "Rewrite API references in the frontend's package.json and OpenAPI config")]
        rewrite_references: bool,

        #[arg(long, help = "Perform a dry run without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Interactive mode - prompt for each change")]
        interactive: bool,
    },

    #[command(about = "Rename a single directory tree")]
    Rename {
        #[arg(help = "Directory to process")]
        target: PathBuf,

        #[arg(short, long, help = "Template name to replace")]
        token: String,

        #[arg(short, long, help = "Hyphenated project name (e.g., 'animal-tracker')")]
        name: String,

        #[arg(long, value_enum, default_value_t = CaseArg::Pascal, help = "Casing applied to the project name")]
        case: CaseArg,

        #[arg(long, help = "Ignore file (defaults to <TARGET>/.gitignore)")]
        ignore_file: Option<PathBuf>,

        #[arg(short, long, help = "Rename file and directory names")]
        path: bool,

        #[arg(short, long, help = "Rewrite file contents")]
        contents: bool,

        #[arg(long, help = "Perform a dry run without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Interactive mode - prompt for each change")]
        interactive: bool,
    },

    #[command(about = "Rewrite API references in a frontend folder")]
    References {
        #[arg(help = "Frontend directory")]
        frontend: PathBuf,

        #[arg(long, help = "Original name of the API folder")]
        api_folder: String,

        #[arg(short, long, help = "Hyphenated project name (e.g., 'animal-tracker')")]
        name: String,

        #[arg(long, default_value = "CAP", help = "Template name of the API project")]
        api_template: String,

        #[arg(long, help = "Perform a dry run without making changes")]
        dry_run: bool,
    },

    #[command(about = "Show the names derived from a project name")]
    Names {
        #[arg(help = "Hyphenated project name (e.g., 'animal-tracker')")]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseArg {
    Pascal,
    Title,
}

impl From<CaseArg> for CaseStyle {
    fn from(value: CaseArg) -> Self {
        match value {
            CaseArg::Pascal => CaseStyle::Pascal,
            CaseArg::Title => CaseStyle::Title,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_command() {
        let args = vec![
            "initrepo",
            "init",
            "--name",
            "animal-tracker",
            "--api-template",
            "CAP",
            "--frontend-template",
            "React DAB!",
            "--workspace",
            "/tmp/workspace",
            "--dry-run",
        ];

        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Init {
                name,
                api_template,
                frontend_template,
                workspace,
                dry_run,
                rewrite_references,
                ..
            } => {
                assert_eq!(name.as_deref(), Some("animal-tracker"));
                assert_eq!(api_template.as_deref(), Some("CAP"));
                assert_eq!(frontend_template.as_deref(), Some("React DAB!"));
                assert_eq!(workspace, Some(PathBuf::from("/tmp/workspace")));
                assert!(dry_run);
                assert!(!rewrite_references);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_rename_command() {
        let args = vec![
            "initrepo",
            "rename",
            "frontend-react",
            "--token",
            "React DAB!",
            "--name",
            "animal-tracker",
            "--case",
            "title",
            "-p",
            "-c",
        ];

        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Rename { target, token, name, case, path, contents, ignore_file, .. } => {
                assert_eq!(target, PathBuf::from("frontend-react"));
                assert_eq!(token, "React DAB!");
                assert_eq!(name, "animal-tracker");
                assert_eq!(case, CaseArg::Title);
                assert_eq!(CaseStyle::from(case), CaseStyle::Title);
                assert!(path);
                assert!(contents);
                assert!(ignore_file.is_none());
            }
            _ => panic!("Expected Rename command"),
        }
    }

    #[test]
    fn test_references_command() {
        let args = vec![
            "initrepo",
            "references",
            "animal-tracker",
            "--api-folder",
            "Api-template",
            "--name",
            "animal-tracker",
        ];

        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::References { frontend, api_folder, api_template, .. } => {
                assert_eq!(frontend, PathBuf::from("animal-tracker"));
                assert_eq!(api_folder, "Api-template");
                assert_eq!(api_template, "CAP");
            }
            _ => panic!("Expected References command"),
        }
    }

    #[test]
    fn test_names_command() {
        let cli = Cli::try_parse_from(["initrepo", "names", "animal-tracker", "--verbose"]).unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Names { name } => assert_eq!(name, "animal-tracker"),
            _ => panic!("Expected Names command"),
        }
    }
}
