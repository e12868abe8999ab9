// src/observer.rs

//! Lifecycle logging through the event bus.
//!
//! The executor itself only emits events; the CLI attaches this observer so
//! that task starts, outcomes and timings show up in the log.

use tracing::{debug, info, warn};

use crate::events::{Event, EventBus, Subscriber};

/// Attach lifecycle logging for every task to `bus`.
pub fn attach_logging(bus: &EventBus) {
    bus.register_lifecycle(Subscriber::AnyTask, |event| {
        log_event(event);
        Ok(())
    });
}

fn log_event(event: &Event<'_>) {
    match *event {
        Event::Start { task } => info!(task = %task.id(), "task started"),
        Event::Success { task } => info!(task = %task.id(), "task succeeded"),
        Event::Failure { task, error } => {
            warn!(task = %task.id(), error = %error, "task failed")
        }
        Event::ProcessingTime { task, elapsed } => {
            info!(task = %task.id(), elapsed_secs = elapsed.as_secs_f64(), "task processing time")
        }
        Event::DependencyDiscovered { task, dependency } => {
            debug!(task = %task.id(), dependency = %dependency.id(), "dependency discovered")
        }
        Event::DependencyMissing { task } => {
            warn!(task = %task.id(), "dependency missing")
        }
        Event::DependencyPresent { task } => {
            debug!(task = %task.id(), "dependency present")
        }
        Event::Custom { task, name, .. } => {
            debug!(task = %task.id(), event = name, "custom event")
        }
    }
}
