//! busadmin - console for the bus-booking admin backend

mod commands;
mod config;
mod logging;
mod store;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tokio::task::LocalSet;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "busadmin")]
#[command(about = "Administer buses, routes and schedules of the booking backend")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the saved session, configuration and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data-dir>/config.json when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend API root, overriding the configuration
    #[arg(long, global = true, env = "BUSADMIN_BASE_URL")]
    base_url: Option<String>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir);

    let component = match &cli.command {
        Commands::Watch { .. } => "watch",
        _ => "cli",
    };
    logging::init_logging(cli.log_level.into(), &data_dir, component, cli.no_file_log)?;

    info!("Starting busadmin");

    // Session timers run on the current thread
    let local = LocalSet::new();
    let result = local
        .run_until(cli.command.execute(
            data_dir,
            cli.config.as_deref(),
            cli.base_url.as_deref(),
        ))
        .await;

    match result {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "busadmin",
            "buses",
            "list",
            "--page",
            "2",
            "--base-url",
            "http://localhost:9000/api",
            "-l",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000/api"));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }
}
