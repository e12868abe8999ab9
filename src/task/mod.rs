// src/task/mod.rs

//! Task nodes.
//!
//! A task declares:
//! - its identity ([`TaskId`])
//! - its upstream requirements ([`Task::requires`])
//! - an idempotent completion check ([`Task::complete`]), which by default
//!   asks the task's output [`Target`] whether it exists
//! - optionally a run body ([`Runnable`]); tasks without one are
//!   "external" and can never produce their own output.

pub mod context;
pub mod id;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::errors::DomainError;
use crate::target::Target;

pub use context::TaskContext;
pub use id::TaskId;

/// Shared handle to a task instance.
pub type TaskRef = Arc<dyn Task>;

/// A node in the build graph.
pub trait Task: fmt::Debug {
    fn id(&self) -> &TaskId;

    /// Capability tags this task's type belongs to, beyond its own family.
    ///
    /// Handlers registered on any of these tags observe events for this task.
    fn ancestors(&self) -> &[&str] {
        &[]
    }

    /// Direct requirements, in declaration order.
    ///
    /// Recomputed on every call; must not have side effects.
    fn requires(&self) -> Vec<TaskRef> {
        Vec::new()
    }

    /// The artifact this task produces, if any.
    fn output(&self) -> Option<Target> {
        None
    }

    /// Whether the task's artifact already exists.
    ///
    /// Tasks without an output are never complete before they run.
    fn complete(&self) -> Result<bool> {
        match self.output() {
            Some(target) => target.exists(),
            None => Ok(false),
        }
    }

    /// The run body, or `None` for external tasks.
    fn body(&self) -> Option<&dyn Runnable> {
        None
    }
}

/// Run-body capability of a task.
pub trait Runnable {
    fn run(&self, ctx: &TaskContext<'_>) -> std::result::Result<(), DomainError>;
}

/// Whether the task matches the given type tag, either by family or by one
/// of its declared ancestors.
pub fn is_instance_of(task: &dyn Task, tag: &str) -> bool {
    task.id().family() == tag || task.ancestors().contains(&tag)
}

/// Outputs of a task's requirements, in declaration order.
///
/// Requirements without an output are skipped.
pub fn inputs(task: &dyn Task) -> Vec<Target> {
    task.requires()
        .iter()
        .filter_map(|dep| dep.output())
        .collect()
}
