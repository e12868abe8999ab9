// src/engine/mod.rs

//! Build execution.
//!
//! - [`executor`] drives one build: resolve, run, report.
//! - [`clock`] abstracts the monotonic clock used for processing times.
//! - [`report`] holds the per-build result types.

pub mod clock;
pub mod executor;
pub mod report;

use std::sync::Arc;

use tracing::debug;

use crate::errors::{LazydagError, Result};
use crate::events::EventBus;
use crate::task::TaskRef;

pub use crate::types::ExecutionMode;
pub use clock::{Clock, MonotonicClock};
pub use executor::{BuildPhase, Executor};
pub use report::{BuildReport, BuildStatus, RootReport};

/// Options selecting how a build runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub mode: ExecutionMode,
}

impl BuildOptions {
    pub fn local() -> Self {
        Self {
            mode: ExecutionMode::Local,
        }
    }
}

/// Build entry point.
///
/// Runs `roots` with the in-process executor. Only
/// [`ExecutionMode::Local`] is supported.
pub fn build(roots: &[TaskRef], options: &BuildOptions, bus: Arc<EventBus>) -> Result<BuildReport> {
    match options.mode {
        ExecutionMode::Local => {
            debug!(roots = roots.len(), "starting local build");
            Executor::new(bus).build(roots)
        }
        mode @ ExecutionMode::Distributed => Err(LazydagError::UnsupportedMode(mode.to_string())),
    }
}
