//! Command line handling for nodemod

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nodemod_config::AppConfig;
use nodemod_recipes::{find_recipe, iter_recipes, run_recipe, RunReport};
use std::path::PathBuf;
use tracing::debug;

/// The main CLI struct.
#[derive(Parser)]
#[command(name = "nodemod")]
#[command(about = "Migrate JavaScript and TypeScript code away from deprecated Node.js APIs")]
#[command(version)]
pub struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// The available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List the available recipes
    List {
        /// Output format (table or json)
        #[arg(long, default_value = "table", value_parser = ["table", "json"])]
        format: String,
    },
    /// Run a recipe over files and directories
    ///
    /// Examples:
    ///   nodemod run util-is src/
    ///   nodemod run chalk-to-util-styletext . --dry-run
    Run {
        /// Recipe name (see `nodemod list`)
        recipe: String,

        /// Files or directories to transform
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Do not run the package manager after editing package.json
        #[arg(long)]
        no_install: bool,

        /// Configuration file (defaults to nodemod.toml in the current directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (pretty or json)
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "json"])]
        format: String,
    },
}

/// Parse arguments and run the command. `Ok(false)` means the command ran
/// but some files failed.
pub async fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { format } => {
            handle_list_command(&format)?;
            Ok(true)
        }
        Commands::Run {
            recipe,
            paths,
            dry_run,
            no_install,
            config,
            format,
        } => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            let mut app_config = AppConfig::load(config.as_deref(), &cwd)
                .context("Failed to load configuration")?;
            app_config.run.dry_run |= dry_run;
            if no_install {
                app_config.run.install = false;
            }
            nodemod_config::logging::initialize(&app_config);
            debug!(config = ?app_config, "Loaded configuration");

            let descriptor = find_recipe(&recipe)?;
            let report = run_recipe(descriptor, &paths, &app_config).await?;
            print_report(&report, &format)?;
            Ok(!report.has_failures())
        }
    }
}

fn handle_list_command(format: &str) -> Result<()> {
    let recipes = iter_recipes();

    match format {
        "json" => {
            let json_output: Vec<serde_json::Value> = recipes
                .iter()
                .map(|descriptor| {
                    serde_json::json!({
                        "name": descriptor.name,
                        "description": descriptor.description,
                        "deprecations": descriptor.deprecations,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        }
        _ => {
            println!("┌{0:─<34}┬{0:─<26}┐", "");
            println!("│ {:<32} │ {:<24} │", "RECIPE", "DEPRECATIONS");
            println!("├{0:─<34}┼{0:─<26}┤", "");

            for descriptor in &recipes {
                println!(
                    "│ {:<32} │ {:<24} │",
                    descriptor.name,
                    deprecation_label(descriptor.deprecations)
                );
            }

            println!("└{0:─<34}┴{0:─<26}┘", "");
            println!();
            println!("{} recipes", recipes.len());
        }
    }
    Ok(())
}

/// `DEP0044..DEP0058`, `DEP0147` or `userland`
fn deprecation_label(deprecations: &[&str]) -> String {
    match deprecations {
        [] => "userland".to_string(),
        [single] => single.to_string(),
        [first, .., last] => format!("{}..{}", first, last),
    }
}

fn print_report(report: &RunReport, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let verb = if report.dry_run { "Would change" } else { "Changed" };
    for path in &report.changed_files {
        println!("  ✏️  {}", path.display());
    }
    println!();
    println!(
        "{}: {} of {} files ({} unchanged, {} failed)",
        verb,
        report.changed(),
        report.scanned,
        report.unchanged,
        report.failed.len()
    );

    for failure in &report.failed {
        eprintln!("  ❌ {}: {}", failure.path.display(), failure.error);
    }
    if !report.removed_dependencies.is_empty() {
        println!(
            "📦 Removed {} from {} package.json file(s)",
            report.removed_dependencies.join(", "),
            report.updated_manifests.len()
        );
    }
    if report.changed() == 0 && !report.has_failures() {
        println!("✅ Nothing to migrate for {}", report.recipe);
    }
    Ok(())
}
