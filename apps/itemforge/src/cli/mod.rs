//! CLI command handling for itemforge

mod report;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forge_config::{logging, AppConfig};
use forge_generator::BatchRunner;
use std::path::PathBuf;
use tracing::debug;

/// Every item succeeded (and, for `check`, nothing would change)
pub const EXIT_OK: i32 = 0;
/// At least one item failed, or `check` found stale files
pub const EXIT_ITEM_FAILURE: i32 = 1;
/// The run could not start
pub const EXIT_FATAL: i32 = 2;

/// The main CLI struct.
#[derive(Parser)]
#[command(name = "itemforge")]
#[command(about = "Generate tModLoader item classes from JSON descriptors")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./itemforge.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// The available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create or update the class file of every descriptor
    Generate(RunArgs),
    /// Report which class files are stale without writing anything
    Check(RunArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the *.json descriptors
    #[arg(long)]
    pub descriptors: Option<PathBuf>,

    /// Directory receiving the generated *.cs files
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only process these item ids (descriptor file stems)
    pub items: Vec<String>,
}

impl RunArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(descriptors) = &self.descriptors {
            config.paths.descriptors = descriptors.clone();
        }
        if let Some(output) = &self.output {
            config.paths.output = output.clone();
        }
    }
}

/// Parse arguments, run the command and return the process exit code
pub fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_FATAL
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<i32> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(EXIT_OK)
        }
        Commands::Generate(args) => {
            args.apply(&mut config);
            run_batch(&config, args.items, false)
        }
        Commands::Check(args) => {
            args.apply(&mut config);
            run_batch(&config, args.items, true)
        }
    }
}

fn run_batch(config: &AppConfig, items: Vec<String>, dry_run: bool) -> anyhow::Result<i32> {
    logging::initialize(config)?;
    debug!(dry_run, items = items.len(), "Starting batch");

    let report = BatchRunner::new(config)?
        .with_filter(items)
        .dry_run(dry_run)
        .run()
        .with_context(|| {
            format!(
                "Cannot read descriptors from {}",
                config.paths.descriptors.display()
            )
        })?;

    print!("{}", report::render(&report, dry_run));

    let stale = dry_run && report.changed() > 0;
    if report.is_success() && !stale {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_ITEM_FAILURE)
    }
}
