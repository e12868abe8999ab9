// src/engine/executor.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::dag::{Resolver, Scheduler, TaskOutcome};
use crate::engine::clock::{Clock, MonotonicClock};
use crate::engine::report::BuildReport;
use crate::errors::{DomainError, LazydagError, Result};
use crate::events::{Event, EventBus};
use crate::task::{TaskContext, TaskId, TaskRef};

/// Build phases, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Resolving,
    Running,
    Done,
}

/// Single-threaded, single-pass executor.
///
/// One call to [`build`](Self::build):
/// 1. resolves the graph from the roots (emitting dependency events)
/// 2. runs every pending node whose requirements are satisfied, in
///    dependency order, emitting START, SUCCESS or FAILURE, then
///    PROCESSING_TIME for each attempt
/// 3. reports which nodes and roots ended satisfied
///
/// A failing task body never aborts the build; its dependents are blocked
/// and independent branches keep running.
pub struct Executor {
    bus: Arc<EventBus>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            clock: Box::new(MonotonicClock::new()),
        }
    }

    /// Replace the clock used to time task runs.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Run one build over `roots`.
    ///
    /// Returns `Err` only for fatal conditions: a dependency cycle, or a
    /// handler failure under the propagate policy. A failing completion
    /// check yields a failed report with `resolution_error` set and nothing
    /// run.
    pub fn build(&self, roots: &[TaskRef]) -> Result<BuildReport> {
        let started = Instant::now();
        let root_ids: Vec<TaskId> = roots.iter().map(|r| r.id().clone()).collect();

        debug!(phase = ?BuildPhase::Resolving, roots = root_ids.len(), "build phase");
        let resolution = match Resolver::new(&self.bus).resolve(roots) {
            Ok(resolution) => resolution,
            Err(LazydagError::Resolution(err)) => {
                debug!(error = %err, "resolution failed; nothing will run");
                debug!(phase = ?BuildPhase::Done, "build phase");
                return Ok(BuildReport::resolution_failed(
                    &root_ids,
                    err,
                    started.elapsed(),
                ));
            }
            Err(other) => return Err(other),
        };

        let mut scheduler = Scheduler::from_resolution(resolution)?;

        debug!(phase = ?BuildPhase::Running, nodes = scheduler.graph().len(), "build phase");
        let mut ran = Vec::new();
        while let Some(task) = scheduler.next_ready() {
            let outcome = self.run_task(&task)?;
            ran.push(task.id().clone());
            let step = scheduler.handle_completion(task.id(), outcome);
            if !step.newly_blocked.is_empty() {
                debug!(task = %task.id(), blocked = ?step.newly_blocked, "dependents blocked");
            }
            if step.build_finished {
                debug!(task = %task.id(), "last runnable task completed");
            }
        }

        let report = BuildReport::from_states(&root_ids, scheduler.into_states(), ran, started.elapsed());
        debug!(
            success = report.success(),
            ran = report.ran.len(),
            failed = report.failed_tasks().len(),
            missing = report.missing_tasks().len(),
            "build finished"
        );
        debug!(phase = ?BuildPhase::Done, "build phase");

        Ok(report)
    }

    /// Run one task body, emitting its lifecycle events.
    fn run_task(&self, task: &TaskRef) -> Result<TaskOutcome> {
        let task = task.as_ref();
        debug!(task = %task.id(), "running task");

        self.bus.emit(&Event::Start { task })?;

        let ctx = TaskContext::new(task, &self.bus);
        let start = self.clock.now();
        let result = match task.body() {
            Some(body) => body.run(&ctx),
            None => Err(DomainError::msg(format!(
                "{} has no run body",
                task.id()
            ))),
        };
        let end = self.clock.now();
        let elapsed = end.saturating_sub(start);

        let outcome = match result {
            Ok(()) => {
                self.bus.emit(&Event::Success { task })?;
                TaskOutcome::Success
            }
            Err(error) => {
                debug!(task = %task.id(), error = %error, "task failed");
                self.bus.emit(&Event::Failure { task, error: &error })?;
                TaskOutcome::Failed
            }
        };

        self.bus.emit(&Event::ProcessingTime { task, elapsed })?;
        debug!(task = %task.id(), elapsed_secs = elapsed.as_secs_f64(), ?outcome, "task finished");

        Ok(outcome)
    }
}
