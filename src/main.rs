//! xbps-prune - XBPS cache retention
//!
//! CLI entry point that validates the keep policy, loads configuration and
//! dispatches to the prune or config command.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xbps_prune::cache::KeepPolicy;
use xbps_prune::cli::commands::PruneOptions;
use xbps_prune::cli::{Cli, Commands};
use xbps_prune::config::ConfigManager;
use xbps_prune::error::{PruneError, PruneResult};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_refusal() => {
            println!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PruneResult<()> {
    let cli = Cli::parse();

    // Refuse before touching config or the cache
    let keep = match (&cli.command, cli.keep) {
        (None, Some(n)) => Some(KeepPolicy::new(n)?),
        _ => None,
    };

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_tracing(cli.verbose, &config.general.log_format);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Some(Commands::Config(args)) => {
            xbps_prune::cli::commands::config(args, &config_manager, &config).await
        }
        None => {
            let keep = keep.ok_or_else(|| PruneError::User("missing -n <N>".to_string()))?;
            let options = PruneOptions::new(keep, cli.delete, cli.cache_dir, cli.format, &config);
            xbps_prune::cli::commands::prune(options, &config).await
        }
    }
}

/// Logging to stderr: 0 = warn, 1 = info, 2+ = debug
fn init_tracing(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("xbps_prune=warn"),
        1 => EnvFilter::new("xbps_prune=info"),
        _ => EnvFilter::new("xbps_prune=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
