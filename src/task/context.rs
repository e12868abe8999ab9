// src/task/context.rs

use std::any::Any;

use crate::errors::HandlerError;
use crate::events::{Event, EventBus};
use crate::task::Task;

/// Handle given to a running task body.
///
/// Lets the body publish custom named events through the build's bus,
/// synchronously and on the executor's thread.
pub struct TaskContext<'a> {
    task: &'a dyn Task,
    bus: &'a EventBus,
}

impl<'a> TaskContext<'a> {
    pub fn new(task: &'a dyn Task, bus: &'a EventBus) -> Self {
        Self { task, bus }
    }

    pub fn task(&self) -> &'a dyn Task {
        self.task
    }

    /// Publish a custom event carrying an arbitrary ordered payload.
    ///
    /// Handlers receive the payload as `&[&dyn Any]` and downcast the values
    /// they expect.
    pub fn trigger_event(&self, name: &str, payload: &[&dyn Any]) -> Result<(), HandlerError> {
        self.bus.emit(&Event::Custom {
            task: self.task,
            name,
            payload,
        })
    }
}
