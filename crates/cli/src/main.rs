use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{init_structured_logging, LoggingConfig, RequestContext};
use domain::{DomainError, ErrorCategory, OccpConfig};
use infrastructure::{ConfigLoader, ConfigValidator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, Instrument};

mod commands;

use commands::{CompileCommand, InitConfigCommand, MergeCommand, WarehouseCommand};

#[derive(Parser)]
#[command(name = "occp")]
#[command(about = "OCCP constraint compiler: optimizer payloads and warehouse rows")]
#[command(version)]
struct Cli {
    /// Configuration file searched before the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a constraint bundle into the optimizer payload
    Compile(CompileCommand),
    /// Map a constraint bundle to warehouse rows
    Warehouse(WarehouseCommand),
    /// Deep-merge two documents with the configured remap table
    Merge(MergeCommand),
    /// Print a commented default configuration
    InitConfig(InitConfigCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Compile(_) => "compile",
            Commands::Warehouse(_) => "warehouse",
            Commands::Merge(_) => "merge",
            Commands::InitConfig(_) => "init-config",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (status, code) = failure_status(&e);
            error!(status, "{:#}", e);
            eprintln!("{status}: {e:#}");
            ExitCode::from(code)
        }
    }
}

/// Status string and process exit code for a failed run
fn failure_status(error: &anyhow::Error) -> (&'static str, u8) {
    match error.downcast_ref::<DomainError>() {
        Some(domain_error) => {
            let category = domain_error.category();
            let code = match category {
                ErrorCategory::InputShape => 2,
                ErrorCategory::LookupMiss => 3,
                ErrorCategory::Configuration => 4,
            };
            (category.status(), code)
        }
        None => ("FAILED", 1),
    }
}

async fn run(cli: Cli) -> Result<()> {
    // init-config must work without a readable configuration
    if let Commands::InitConfig(command) = &cli.command {
        return command.execute().await;
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path.clone());
    }
    let (config, sources) = loader.load_with_sources().await?;

    let mut logging = LoggingConfig::from_settings(
        &config.logging.level,
        config.logging.json_output,
        config.logging.color_output,
    )?;
    if cli.verbose {
        logging = logging.verbose();
    }
    init_structured_logging(logging)?;

    debug!(profile = config.profile.name(), sources = ?sources, "Configuration loaded");
    ConfigValidator::new().validate(&config)?;

    let context = RequestContext::new();
    let command_name = cli.command.name();
    let span = context.span(command_name);
    info!(request_id = %context.request_id, command = command_name, "Starting");

    dispatch(cli.command, &config).instrument(span).await
}

async fn dispatch(command: Commands, config: &OccpConfig) -> Result<()> {
    match command {
        Commands::Compile(command) => command.execute(config).await,
        Commands::Warehouse(command) => command.execute(config).await,
        Commands::Merge(command) => command.execute(config).await,
        Commands::InitConfig(command) => command.execute().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_status_follows_error_category() {
        let cases = [
            (DomainError::EmptyBrandList, "INVALID_INPUT", 2),
            (
                DomainError::ChannelNotFound("FAX".to_string()),
                "REFERENCE_LOOKUP_FAILED",
                3,
            ),
            (
                DomainError::UnparsableCycleRange("Q1 2025".to_string()),
                "REFERENCE_LOOKUP_FAILED",
                3,
            ),
            (
                DomainError::UnparsableDate("13/45/2025".to_string()),
                "REFERENCE_LOOKUP_FAILED",
                3,
            ),
            (DomainError::ZeroLengthCycle, "CONFIGURATION_ERROR", 4),
        ];

        for (error, status, code) in cases {
            assert_eq!(failure_status(&anyhow::Error::new(error)), (status, code));
        }
        assert_eq!(
            failure_status(&anyhow::anyhow!("disk full")),
            ("FAILED", 1)
        );
    }
}
