// src/lib.rs

pub mod action;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::{Coordinator, Interrupts};
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::watch::NotifySource;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the notify-backed event source and the initial watch set
/// - SIGINT/SIGTERM subscription
/// - the coordinator loop
///
/// Returns `Ok(())` after an interrupt once every child has been stopped.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config_path();
    let cfg = load_and_validate(&config_path)?;
    info!(
        config = %config_path.display(),
        actions = cfg.actions.len(),
        hooks = cfg.post_hooks.len(),
        "configuration loaded"
    );

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let (source, streams) = NotifySource::new()?;
    let interrupts = Interrupts::os()?;
    let coordinator = Coordinator::new(
        &cfg,
        Path::new("."),
        source,
        streams,
        Arc::new(RealFileSystem),
        interrupts,
    )?;

    coordinator.run().await
}

/// Simple dry-run output: actions, their commands, and hooks.
fn print_dry_run(cfg: &ConfigFile) {
    println!("devwatch dry-run");
    println!("  debug = {}", cfg.debug);
    println!("  grace_period = {:?}", cfg.grace_period);
    if !cfg.exclude.is_empty() {
        println!("  exclude = {:?}", cfg.exclude);
    }
    println!();

    println!("actions ({}):", cfg.actions.len());
    for (i, action) in cfg.actions.iter().enumerate() {
        println!("  [{i}] pattern: {}", action.pattern);
        match &action.build {
            Some(build) => println!("      build: {build}"),
            None => println!("      build: (skipped)"),
        }
        match &action.run {
            Some(run) => println!("      run: {run}"),
            None => println!("      run: (skipped)"),
        }
    }

    if !cfg.post_hooks.is_empty() {
        println!();
        println!("post hooks ({}):", cfg.post_hooks.len());
        for hook in &cfg.post_hooks {
            println!("  > {hook}");
        }
    }

    debug!("dry-run complete (no execution)");
}
