//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// xbps-prune - trim old package versions from the XBPS cache
///
/// Keeps the newest N versions of every package and never touches held
/// packages or anything they depend on. Runs as a dry run unless `-d true`.
#[derive(Parser, Debug)]
#[command(name = "xbps-prune")]
#[command(author, version, long_about = None)]
#[command(subcommand_negates_reqs = true)]
#[command(after_help = "A keep count of 3 is suggested (current version + 2).")]
pub struct Cli {
    /// Optional subcommand (omit to prune)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Number of newest versions to keep per package
    #[arg(
        short = 'n',
        long = "keep",
        value_name = "N",
        required = true,
        allow_negative_numbers = true
    )]
    pub keep: Option<i64>,

    /// "true" to actually delete cache items; anything else is a dry run
    #[arg(
        short = 'd',
        long = "delete",
        value_name = "BOOL",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = parse_delete_flag
    )]
    pub delete: bool,

    /// Cache directory (default: cache.dir from config, /var/cache/xbps)
    #[arg(short = 'c', long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, global = true, env = "XBPS_PRUNE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the prune report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON report on stdout
    Json,
}

/// Parse the `-d` value: only "true" (any case) enables deletion
fn parse_delete_flag(s: &str) -> Result<bool, String> {
    Ok(s.eq_ignore_ascii_case("true"))
}
