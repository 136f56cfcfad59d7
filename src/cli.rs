// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `qdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qdag",
    version,
    about = "Submit dependency-ordered job pipelines to a batch scheduler.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline file (TOML).
    ///
    /// Default: `Qdag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Qdag.toml")]
    pub config: String,

    /// Override the persisted submission log path.
    #[arg(long, value_name = "PATH")]
    pub log: Option<String>,

    /// Keep the submission log in memory only; nothing is persisted, so the
    /// next run will not remember these submissions.
    #[arg(long)]
    pub no_log: bool,

    /// Milliseconds to pause between successive top-level submissions.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the pipeline, but submit nothing.
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
