// src/dag/scheduler_step.rs

use crate::task::TaskId;

/// Structured result of recording one run outcome.
#[derive(Debug, Clone)]
pub struct SchedulerStep {
    /// Dependents newly marked blocked because of this outcome.
    pub newly_blocked: Vec<TaskId>,
    /// Whether every node is now terminal.
    pub build_finished: bool,
}
