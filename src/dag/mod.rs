// src/dag/mod.rs

//! Graph resolution and scheduling.
//!
//! - [`resolver`] walks the task graph lazily from the roots and classifies
//!   every node as present, missing or pending.
//! - [`graph`] holds the resolved part of the graph.
//! - [`scheduler`] is the per-build state machine that decides which pending
//!   node may run next and blocks dependents of failed nodes.
//! - [`state`] defines node classes and run states.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod graph;
pub mod resolver;
pub mod scheduler;
pub mod scheduler_step;
pub mod state;

pub use graph::ResolvedGraph;
pub use resolver::{Resolution, Resolver};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use state::{NodeClass, RunState, TaskOutcome};
