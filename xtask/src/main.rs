use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgMatches, Command};

const FIXTURE_DIR: &str = "target/xtask-fixture";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install initrepo binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run initrepo with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to initrepo")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run all tests for the entire project"))
                .subcommand(Command::new("core").about("Run tests for initrepo-core"))
                .subcommand(Command::new("bin").about("Run tests for initrepo-bin"))
                .subcommand(Command::new("integration").about("Run initrepo against a generated workspace"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", args)) => handle_install_command(args),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn handle_install_command(_args: &ArgMatches) -> Result<()> {
    println!("Installing initrepo...");
    cargo(&["install", "--path", "crates/initrepo-bin"], "Failed to install initrepo")?;
    println!("✓ initrepo installed successfully");
    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    println!("Building and running initrepo...");

    let mut cargo_args = vec!["run".to_string(), "--bin".to_string(), "initrepo".to_string(), "--".to_string()];
    if let Some(values) = args.get_many::<String>("args") {
        cargo_args.extend(values.cloned());
    }

    let status = process::Command::new("cargo").args(&cargo_args).status()?;
    if !status.success() {
        anyhow::bail!("Failed to run initrepo");
    }

    Ok(())
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => cargo(&["test", "--package", "initrepo-core"], "Core tests failed"),
        Some(("bin", _args)) => cargo(&["test", "--package", "initrepo-bin"], "Binary tests failed"),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run all tests for the entire project");
            println!("  core         - Run tests for initrepo-core");
            println!("  bin          - Run tests for initrepo-bin");
            println!("  integration  - Run initrepo against a generated workspace");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    println!("🧪 Running all tests for the initrepo project...\n");

    let steps: [(&str, fn() -> Result<()>); 4] = [
        ("📚 initrepo-core", || cargo(&["test", "--package", "initrepo-core"], "Core tests failed")),
        ("🔧 initrepo-bin", || cargo(&["test", "--package", "initrepo-bin"], "Binary tests failed")),
        ("📖 documentation", || cargo(&["test", "--doc", "--package", "initrepo-core"], "Documentation tests failed")),
        ("🔗 integration", test_integration),
    ];

    let mut all_passed = true;
    for (label, step) in steps {
        println!("Running {} tests...", label);
        match step() {
            Ok(()) => println!("✅ {} tests passed\n", label),
            Err(err) => {
                all_passed = false;
                println!("❌ {} tests failed: {:#}\n", label, err);
            }
        }
    }

    if !all_passed {
        println!("💥 Some tests failed. Please check the output above.");
        anyhow::bail!("Test suite failed");
    }

    println!("🎉 All tests passed successfully!");
    Ok(())
}

// Builds a small template workspace, runs `initrepo init` on it and checks the result.
fn test_integration() -> Result<()> {
    cargo(&["build", "--bin", "initrepo"], "Failed to build initrepo binary")?;

    let workspace = PathBuf::from(FIXTURE_DIR);
    if workspace.exists() {
        fs::remove_dir_all(&workspace)?;
    }
    write_fixture(&workspace, "Api-template/.gitignore", "*.log\n")?;
    write_fixture(&workspace, "Api-template/CAP.API/appsettings.json", "\"Name\": \"CAP\"")?;
    write_fixture(&workspace, "Api-template/debug.CAP.log", "CAP")?;
    write_fixture(&workspace, "frontend-react/.gitignore", "")?;
    write_fixture(&workspace, "frontend-react/index.html", "<title>React DAB!</title>")?;

    let workspace_arg = workspace.to_string_lossy().to_string();
    cargo(
        &[
            "run", "--bin", "initrepo", "--", "init",
            "--workspace", &workspace_arg,
            "--name", "animal-tracker",
            "--api-template", "CAP",
            "--frontend-template", "React DAB!",
        ],
        "initrepo init failed",
    )?;

    expect_file(&workspace, "animal-tracker-api/AnimalTracker.API/appsettings.json", "\"Name\": \"AnimalTracker\"")?;
    expect_file(&workspace, "animal-tracker-api/debug.CAP.log", "CAP")?;
    expect_file(&workspace, "animal-tracker/index.html", "<title>Animal Tracker</title>")?;

    fs::remove_dir_all(&workspace)?;
    Ok(())
}

fn write_fixture(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn expect_file(root: &Path, relative: &str, expected: &str) -> Result<()> {
    let path = root.join(relative);
    let actual = fs::read_to_string(&path).with_context(|| format!("Expected {:?} to exist", path))?;
    if actual != expected {
        anyhow::bail!("Unexpected contents in {:?}: {:?}", path, actual);
    }
    Ok(())
}

fn cargo(args: &[&str], failure: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{}", failure);
    }
    Ok(())
}
