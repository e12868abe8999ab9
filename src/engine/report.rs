// src/engine/report.rs

//! Build results.

use std::collections::HashMap;
use std::time::Duration;

use crate::dag::RunState;
use crate::errors::ResolutionError;
use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every node reachable from the roots ended present or succeeded.
    Succeeded,
    Failed,
}

/// Final state of one root.
#[derive(Debug, Clone)]
pub struct RootReport {
    pub id: TaskId,
    /// `None` if resolution aborted before the root was classified.
    pub state: Option<RunState>,
    /// Whether the root's artifact exists at the end of the build.
    pub output_exists: bool,
}

/// Result of a single build.
#[derive(Debug)]
pub struct BuildReport {
    pub status: BuildStatus,
    pub roots: Vec<RootReport>,
    /// Final state of every resolved node.
    pub states: HashMap<TaskId, RunState>,
    /// Nodes whose body was invoked, in run order.
    pub ran: Vec<TaskId>,
    pub duration: Duration,
    /// Set when a completion check failed and nothing was run.
    pub resolution_error: Option<ResolutionError>,
}

impl BuildReport {
    pub(crate) fn from_states(
        roots: &[TaskId],
        states: HashMap<TaskId, RunState>,
        ran: Vec<TaskId>,
        duration: Duration,
    ) -> Self {
        let roots: Vec<RootReport> = roots
            .iter()
            .map(|id| {
                let state = states.get(id).copied();
                RootReport {
                    id: id.clone(),
                    state,
                    output_exists: state.is_some_and(|s| s.is_satisfied()),
                }
            })
            .collect();

        let status = if states.values().all(|s| s.is_satisfied()) {
            BuildStatus::Succeeded
        } else {
            BuildStatus::Failed
        };

        Self {
            status,
            roots,
            states,
            ran,
            duration,
            resolution_error: None,
        }
    }

    pub(crate) fn resolution_failed(
        roots: &[TaskId],
        error: ResolutionError,
        duration: Duration,
    ) -> Self {
        Self {
            status: BuildStatus::Failed,
            roots: roots
                .iter()
                .map(|id| RootReport {
                    id: id.clone(),
                    state: None,
                    output_exists: false,
                })
                .collect(),
            states: HashMap::new(),
            ran: Vec::new(),
            duration,
            resolution_error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    pub fn state_of(&self, id: &TaskId) -> Option<RunState> {
        self.states.get(id).copied()
    }

    /// Roots whose artifact does not exist after the build.
    pub fn failed_roots(&self) -> Vec<&TaskId> {
        self.roots
            .iter()
            .filter(|r| !r.output_exists)
            .map(|r| &r.id)
            .collect()
    }

    pub fn failed_tasks(&self) -> Vec<&TaskId> {
        self.with_state(RunState::Failed)
    }

    pub fn missing_tasks(&self) -> Vec<&TaskId> {
        self.with_state(RunState::Missing)
    }

    pub fn blocked_tasks(&self) -> Vec<&TaskId> {
        self.with_state(RunState::Blocked)
    }

    pub fn count(&self, state: RunState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// Ids with the given state, sorted for stable output.
    fn with_state(&self, state: RunState) -> Vec<&TaskId> {
        let mut ids: Vec<&TaskId> = self
            .states
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }
}
