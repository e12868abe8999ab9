// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::debug;

use crate::dag::graph::ResolvedGraph;
use crate::dag::resolver::Resolution;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state::{RunState, TaskOutcome};
use crate::errors::GraphError;
use crate::task::{TaskId, TaskRef};

/// Per-build scheduling state over a resolved graph.
///
/// Pure: it performs no IO and runs nothing. It is responsible for:
/// - handing out pending nodes whose requirements are all satisfied, in
///   topological order
/// - recording run outcomes
/// - blocking dependents of nodes that can no longer be satisfied
#[derive(Debug)]
pub struct Scheduler {
    graph: ResolvedGraph,
    states: HashMap<TaskId, RunState>,
    order: Vec<TaskId>,
    roots: Vec<TaskId>,
}

impl Scheduler {
    pub fn from_resolution(resolution: Resolution) -> Result<Self, GraphError> {
        let order = resolution.graph.topological_order()?;
        let states = resolution
            .classes
            .iter()
            .map(|(id, class)| (id.clone(), RunState::from(*class)))
            .collect();

        Ok(Self {
            graph: resolution.graph,
            states,
            order,
            roots: resolution.roots,
        })
    }

    pub fn graph(&self) -> &ResolvedGraph {
        &self.graph
    }

    pub fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    pub fn run_state_of(&self, id: &TaskId) -> Option<RunState> {
        self.states.get(id).copied()
    }

    pub fn states(&self) -> &HashMap<TaskId, RunState> {
        &self.states
    }

    pub fn into_states(self) -> HashMap<TaskId, RunState> {
        self.states
    }

    /// Whether every node has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }

    /// Whether all requirements of `id` are satisfied.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, id: &TaskId) -> Option<bool> {
        if !self.states.contains_key(id) {
            return None;
        }
        Some(self.graph.dependencies_of(id).iter().all(|dep| {
            self.states
                .get(dep)
                .is_some_and(|s| s.is_satisfied())
        }))
    }

    /// Next pending node that may run now, marked `Running`.
    ///
    /// Pending nodes found behind an unsatisfiable requirement are marked
    /// `Blocked` on the way.
    pub fn next_ready(&mut self) -> Option<TaskRef> {
        let mut ready = None;

        for id in &self.order {
            if self.states.get(id) != Some(&RunState::Pending) {
                continue;
            }

            let deps = self.graph.dependencies_of(id);
            let blocked_by = deps.iter().find(|dep| {
                self.states
                    .get(*dep)
                    .is_some_and(|s| s.is_unsatisfiable())
            });

            if let Some(dep) = blocked_by {
                debug!(task = %id, dep = %dep, "requirement unsatisfiable; blocking");
                self.states.insert(id.clone(), RunState::Blocked);
                continue;
            }

            let satisfied = deps
                .iter()
                .all(|dep| self.states.get(dep).is_some_and(|s| s.is_satisfied()));
            if satisfied {
                ready = Some(id.clone());
                break;
            }
        }

        let id = ready?;
        self.states.insert(id.clone(), RunState::Running);
        debug!(task = %id, "requirements satisfied; marking Running");
        self.graph.task(&id).cloned()
    }

    /// Record the outcome of a run.
    pub fn handle_completion(&mut self, id: &TaskId, outcome: TaskOutcome) -> SchedulerStep {
        let mut newly_blocked = Vec::new();

        match self.states.get(id) {
            Some(RunState::Running) => match outcome {
                TaskOutcome::Success => {
                    self.states.insert(id.clone(), RunState::Succeeded);
                    debug!(task = %id, "task completed successfully");
                }
                TaskOutcome::Failed => {
                    self.states.insert(id.clone(), RunState::Failed);
                    debug!(task = %id, "task failed; blocking dependents in this build");
                    newly_blocked = self.mark_dependents_blocked(id);
                }
            },
            Some(other) => {
                debug!(task = %id, state = ?other, "completion for task that is not running; ignoring");
            }
            None => {
                debug!(task = %id, "completion for unknown task; ignoring");
            }
        }

        let build_finished = self.is_finished();
        if build_finished {
            debug!("scheduler: all tasks terminal");
        }

        SchedulerStep {
            newly_blocked,
            build_finished,
        }
    }

    /// Mark every pending transitive dependent of `id` as `Blocked`.
    fn mark_dependents_blocked(&mut self, id: &TaskId) -> Vec<TaskId> {
        let mut stack = self.graph.dependents_of(id);
        let mut newly_blocked = Vec::new();

        while let Some(name) = stack.pop() {
            if self.states.get(&name) == Some(&RunState::Pending) {
                debug!(task = %name, "marking dependent as Blocked due to upstream failure");
                self.states.insert(name.clone(), RunState::Blocked);
                stack.extend(self.graph.dependents_of(&name));
                newly_blocked.push(name);
            }
        }

        newly_blocked
    }
}
