// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `devwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devwatch",
    version,
    about = "Rebuild and restart commands when watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Config file, JSON or TOML (by `.toml` extension).
    /// Defaults to `.devwatch.json` in the current directory.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Log verbosity. Overrides `DEVWATCH_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the config and print what would run, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
