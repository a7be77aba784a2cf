//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Level;
use std::path::PathBuf;

/// async-log - load generator and config tooling for the async log dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "async-log",
    author,
    version,
    about = "Asynchronous log dispatcher toolkit",
    long_about = "Drives the asynchronous log dispatcher with concurrent producers.\n\n\
                  Builds the dispatcher, formatter and sinks from a logging configuration, \n\
                  submits records from several threads and reports throughput and latency."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ASYNC_LOG_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ASYNC_LOG_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit records through a dispatcher built from configuration
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults if omitted
    #[arg(short, long, env = "ASYNC_LOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of producer threads
    #[arg(short, long, default_value = "4", env = "ASYNC_LOG_PRODUCERS")]
    pub producers: usize,

    /// Records submitted by each producer
    #[arg(short, long, default_value = "10000", env = "ASYNC_LOG_RECORDS")]
    pub records: u64,

    /// Padding appended to each message, in bytes
    #[arg(long, default_value = "64")]
    pub message_size: usize,

    /// Logger name prefix (producer index is appended)
    #[arg(long, default_value = "load")]
    pub logger_name: String,

    /// Severity of generated records
    #[arg(long, default_value = "info")]
    pub level: Level,

    /// Override dispatcher queue capacity from configuration
    #[arg(long, env = "ASYNC_LOG_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Override shutdown timeout from configuration, in milliseconds
    #[arg(long)]
    pub shutdown_timeout_ms: Option<u64>,

    /// Stop producing after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "ASYNC_LOG_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "ASYNC_LOG_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logging.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "logging.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink parameters
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
