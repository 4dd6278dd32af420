mod commands;
mod config;
mod executor;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::RunnerConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "judge-runner")]
#[command(about = "Judge runner - Run test suites against an execution unit", long_about = None)]
struct Cli {
    /// Runner config file (defaults to config/runner.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Execution unit binary (overrides config and JUDGE_UNIT_BIN)
    #[arg(long, global = true)]
    unit: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suite against a function and print the JSON response
    Run {
        /// Suite file: a case array or a problem definition
        #[arg(short, long)]
        suite: PathBuf,

        /// Function under test (defaults to the problem's functionName)
        #[arg(short, long)]
        function: Option<String>,

        /// Wall-clock limit for the whole run in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Include the problem's hidden cases
        #[arg(long)]
        hidden: bool,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },

    /// List the functions registered in the execution unit
    Functions,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries the JSON response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::load_default()?,
    }
    .with_env_overrides();

    if let Some(unit) = cli.unit {
        config.unit_binary = unit;
    }

    match cli.command {
        Commands::Run {
            suite,
            function,
            timeout_ms,
            hidden,
            pretty,
        } => {
            if let Some(timeout_ms) = timeout_ms {
                anyhow::ensure!(timeout_ms > 0, "--timeout-ms must be greater than zero");
                config.timeout_ms = timeout_ms;
            }

            let completed =
                commands::run_suite(&suite, function.as_deref(), hidden, pretty, &config).await?;
            if !completed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Functions => {
            commands::list_functions(&config).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
