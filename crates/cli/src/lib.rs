pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::recommend::RecommendArgs;
use greenswap_core::config::{AppConfig, ConfigError, LoadOptions, LogFormat};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "greenswap",
    about = "Greenswap operator CLI",
    long_about = "Recommend lower-emission alternatives from the product catalog, and manage the catalog database.",
    after_help = "Examples:\n  greenswap migrate\n  greenswap seed\n  greenswap recommend --category kitchenware --product-id 1\n  greenswap doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List greener neighbors of one product within its category")]
    Recommend {
        #[arg(long, help = "Product category, e.g. clothing or kitchenware")]
        category: String,
        #[arg(long = "product-id", help = "Id of the selected product")]
        product_id: i64,
        #[arg(short = 'k', long, help = "Neighbors to consider (defaults to recommend.default_k)")]
        k: Option<usize>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and verify it")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, emission table, DB connectivity, and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Installs a stderr subscriber from `[logging]`; stdout carries command
/// output only. When the config does not load, the command reports that
/// itself, so logging falls back to warnings in compact form.
pub fn init_logging() {
    let (level, format) = logging_settings(AppConfig::load(LoadOptions::default()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn logging_settings(config: Result<AppConfig, ConfigError>) -> (Level, LogFormat) {
    match config {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        Err(_) => (Level::WARN, LogFormat::Compact),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { category, product_id, k, json } => {
            commands::recommend::run(RecommendArgs { category, product_id, k, json })
        }
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
