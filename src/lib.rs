// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod logging;
pub mod observer;
pub mod target;
pub mod task;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, ModeArg};
use crate::config::{default_config_path, load_and_validate, ConfigFile};
use crate::engine::{BuildOptions, BuildReport, ExecutionMode};
use crate::events::EventBus;
use crate::exec::Catalog;

pub use crate::engine::{build, Executor};
pub use crate::errors::{DomainError, LazydagError};
pub use crate::events::{Event, EventKind, Subscriber};
pub use crate::task::{Runnable, Task, TaskContext, TaskId, TaskRef};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - task catalog and root selection
/// - event bus with lifecycle logging
/// - the build itself
///
/// Returns whether the build succeeded.
pub fn run(args: CliArgs) -> Result<bool> {
    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(true);
    }

    let root_dir = config_root_dir(&config_path);
    let catalog = Catalog::from_config(&cfg, &root_dir)?;

    let roots = if args.tasks.is_empty() {
        catalog.default_roots()
    } else {
        catalog.select(&args.tasks)?
    };
    let root_names: Vec<String> = roots.iter().map(|r| r.id().to_string()).collect();
    info!(roots = ?root_names, "building");

    let bus = Arc::new(EventBus::with_policy(cfg.build.handler_errors));
    observer::attach_logging(&bus);

    let options = BuildOptions {
        mode: match args.mode {
            Some(ModeArg::Local) => ExecutionMode::Local,
            Some(ModeArg::Distributed) => ExecutionMode::Distributed,
            None => cfg.build.mode,
        },
    };

    let report = build(&roots, &options, bus)?;
    print_summary(&report);
    Ok(report.success())
}

/// Figure out the directory task outputs and commands are relative to.
///
/// - If the config path has a non-empty parent (e.g. "pipelines/Lazydag.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Lazydag.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_summary(report: &BuildReport) {
    let verdict = if report.success() { "succeeded" } else { "failed" };
    println!(
        "lazydag: build {verdict} in {:.2}s ({} ran)",
        report.duration.as_secs_f64(),
        report.ran.len()
    );

    for root in &report.roots {
        let mark = if root.output_exists { "ok" } else { "MISSING" };
        match root.state {
            Some(state) => println!("  [{mark}] {} ({state:?})", root.id),
            None => println!("  [{mark}] {}", root.id),
        }
    }

    for id in report.failed_tasks() {
        println!("  failed:  {id}");
    }
    for id in report.missing_tasks() {
        println!("  missing: {id}");
    }
    if let Some(err) = &report.resolution_error {
        println!("  error:   {err}");
    }
}

/// Simple dry-run output: print tasks, params, commands and requirements.
fn print_dry_run(cfg: &ConfigFile) {
    println!("lazydag dry-run");
    println!("  build.mode = {}", cfg.build.mode);
    println!("  build.handler_errors = {:?}", cfg.build.handler_errors);
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        if task.family.is_some() {
            println!("      family: {}", task.effective_family(name));
        }
        if !task.params.is_empty() {
            let params: Vec<String> = task
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("      params: {}", params.join(", "));
        }
        match task.cmd {
            Some(ref cmd) => println!("      cmd: {cmd}"),
            None => println!("      external"),
        }
        if let Some(ref output) = task.output {
            println!("      output: {output}");
        }
        if !task.requires.is_empty() {
            println!("      requires: {:?}", task.requires);
        }
    }

    debug!("dry-run complete (nothing built)");
}
