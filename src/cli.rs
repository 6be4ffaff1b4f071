// src/cli.rs

//! CLI argument parsing using `clap`.

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskbraid`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskbraid",
    version,
    about = "Project task units from their event history and braid them into chains and paths.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML).
    ///
    /// Default: `Taskbraid.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Taskbraid.toml")]
    pub project: String,

    /// Reference time (RFC 3339) used for validation and projection.
    ///
    /// Overrides `[project].now`; if both are absent the wall clock is used.
    #[arg(long, value_name = "RFC3339")]
    pub now: Option<DateTime<Utc>>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKBRAID_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and list units with their apparent dates, without clustering.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
