// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `lazydag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lazydag",
    version,
    about = "Build the missing parts of a task graph declared in a TOML file.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to build (section names). Defaults to every task nothing else
    /// requires.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `LAZYDAG_CONFIG`, else `Lazydag.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[build].mode` from the config.
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAZYDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the tasks, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execution mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ModeArg {
    Local,
    Distributed,
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
