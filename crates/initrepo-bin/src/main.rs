mod actions;
mod cli;
mod review;

use actions::{ActionInputs, RunMode};
use anyhow::Result;
use cli::{CaseArg, Cli, Commands};
use initrepo_core::{
    ApproveAll, CaseStyle, ChangeReview, IgnoreFilter, ProjectName, ReferenceRewrite, RenamePass, RenameSummary,
    ScaffoldConfig, TemplateOptions,
};
use review::InteractiveReview;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let mode = RunMode::detect();

    setup_logging(&cli, mode);

    info!("Starting initrepo");

    match run(cli, mode) {
        Ok(()) => {
            info!("initrepo completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&err, mode);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, mode: RunMode) -> Result<()> {
    match cli.command {
        Commands::Init {
            name,
            api_template,
            frontend_template,
            workspace,
            rewrite_references,
            dry_run,
            interactive,
        } => {
            let inputs = ActionInputs {
                name,
                api_template,
                frontend_template,
            };
            handle_init_command(inputs, workspace, rewrite_references, dry_run, interactive, mode)
        }
        Commands::Rename {
            target,
            token,
            name,
            case,
            ignore_file,
            path,
            contents,
            dry_run,
            interactive,
        } => {
            // Neither -p nor -c given: ask, or do both on a runner
            let (path, contents) = if !path && !contents {
                choose_rename_scope(mode)?
            } else {
                (path, contents)
            };
            let options = TemplateOptions {
                process_paths: path,
                process_contents: contents,
                dry_run,
            };
            handle_rename_command(target, token, name, case, ignore_file, options, interactive, mode)
        }
        Commands::References {
            frontend,
            api_folder,
            name,
            api_template,
            dry_run,
        } => handle_references_command(frontend, api_folder, name, api_template, dry_run),
        Commands::Names { name } => handle_names_command(name),
    }
}

fn handle_init_command(
    inputs: ActionInputs,
    workspace: Option<PathBuf>,
    rewrite_references: bool,
    dry_run: bool,
    interactive: bool,
    mode: RunMode,
) -> Result<()> {
    let inputs = inputs.resolve(mode)?;
    info!("name-to-replace-with: {}", inputs.name);
    info!("api-template-name: {}", inputs.api_template);
    info!("frontend-template-name: {}", inputs.frontend_template);

    let project_name = ProjectName::parse(&inputs.name)?;
    let workspace = match workspace {
        Some(workspace) => workspace,
        None => std::env::current_dir()?,
    };
    info!("Workspace: {:?}", workspace);

    if dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    if !workspace.is_dir() {
        anyhow::bail!("Workspace must be a directory: {:?}", workspace);
    }

    let config = ScaffoldConfig {
        workspace,
        project_name,
        api_template: inputs.api_template,
        frontend_template: inputs.frontend_template,
        dry_run,
        rewrite_references,
    };

    let review = select_review(interactive, mode)?;
    let report = initrepo_core::scaffold_workspace(&config, &*review)?;

    println!("Scaffolding complete!");
    println!("  API folder: {}", report.api_root.display());
    println!("  Frontend folder: {}", report.frontend_root.display());
    print_summary(&report.total());
    if rewrite_references {
        println!("  Reference files rewritten: {}", report.references_rewritten);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_rename_command(
    target: PathBuf,
    token: String,
    name: String,
    case: CaseArg,
    ignore_file: Option<PathBuf>,
    options: TemplateOptions,
    interactive: bool,
    mode: RunMode,
) -> Result<()> {
    let project_name = ProjectName::parse(&name)?;
    let replacement = CaseStyle::from(case).apply(&project_name);

    info!("Replacement: '{}' -> '{}'", token, replacement);
    info!("Target directory: {:?}", target);
    info!("Path renaming: {}", options.process_paths);
    info!("Contents rewriting: {}", options.process_contents);
    info!("Interactive mode: {}", interactive);

    if options.dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    if !target.is_dir() {
        anyhow::bail!("Target must be a directory: {:?}", target);
    }

    let ignore = match ignore_file {
        Some(ignore_file) => IgnoreFilter::load_file(&ignore_file)?,
        None => IgnoreFilter::load(&target)?,
    };
    info!("Ignore rules: {:?}", ignore.source());

    let pass = RenamePass::new(target, &token, &replacement, ignore).with_options(options);
    let review = select_review(interactive, mode)?;
    let summary = initrepo_core::rename_tree(&pass, &*review)?;

    println!("Renaming complete!");
    print_summary(&summary);

    Ok(())
}

fn handle_references_command(
    frontend: PathBuf,
    api_folder: String,
    name: String,
    api_template: String,
    dry_run: bool,
) -> Result<()> {
    let project_name = ProjectName::parse(&name)?;

    if dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    if !frontend.is_dir() {
        anyhow::bail!("Frontend folder must be a directory: {:?}", frontend);
    }

    let rewrite = ReferenceRewrite {
        frontend_root: frontend,
        old_api_folder: api_folder,
        new_api_folder: project_name.api_folder_name(),
        api_template,
        api_display_name: CaseStyle::Pascal.apply(&project_name),
    };
    let changed = initrepo_core::rewrite_references(&rewrite, dry_run)?;

    println!("Reference rewrite complete!");
    println!("  Files changed: {}", changed);

    Ok(())
}

fn handle_names_command(name: String) -> Result<()> {
    let project_name = ProjectName::parse(&name)?;

    println!("API folder:      {}", project_name.api_folder_name());
    println!("API name:        {}", CaseStyle::Pascal.apply(&project_name));
    println!("Frontend folder: {}", project_name.frontend_folder_name());
    println!("Frontend name:   {}", CaseStyle::Title.apply(&project_name));

    Ok(())
}

fn choose_rename_scope(mode: RunMode) -> Result<(bool, bool)> {
    if mode == RunMode::Actions {
        return Ok((true, true));
    }

    use inquire::Confirm;

    let enable_path = Confirm::new("Rename file and directory names (-p)?")
        .with_default(true)
        .prompt()?;

    let enable_contents = Confirm::new("Rewrite file contents (-c)?")
        .with_default(true)
        .prompt()?;

    if !enable_path && !enable_contents {
        anyhow::bail!("At least one of --path (-p) or --contents (-c) must be enabled");
    }

    Ok((enable_path, enable_contents))
}

fn select_review(interactive: bool, mode: RunMode) -> Result<Box<dyn ChangeReview>> {
    match (interactive, mode) {
        (false, _) => Ok(Box::new(ApproveAll)),
        (true, RunMode::Local) => Ok(Box::new(InteractiveReview)),
        (true, RunMode::Actions) => anyhow::bail!("Interactive mode is not available inside GitHub Actions"),
    }
}

fn print_summary(summary: &RenameSummary) {
    println!("  Files processed: {}", summary.files_processed);
    println!("  Paths renamed: {}", summary.paths_renamed);
    println!("  Content changes: {}", summary.content_changes);
    println!("  Entries ignored: {}", summary.entries_ignored);
}

fn report_failure(err: &anyhow::Error, mode: RunMode) {
    let message = format!("{:#}", err);
    error!("{}", message);
    if mode == RunMode::Actions {
        println!("{}", actions::error_command(&message));
    }
}

fn setup_logging(cli: &Cli, mode: RunMode) {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(mode == RunMode::Local)
                .compact(),
        )
        .with(filter)
        .init();
}
