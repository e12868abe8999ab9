// src/dag/state.rs

//! Node classification and per-build run state.

/// How the resolver classified a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Output already exists; never run, requirements not explored.
    Present,
    /// Incomplete and without a run body; can never be satisfied this build.
    Missing,
    /// Incomplete and runnable; will run once its requirements are satisfied.
    Pending,
}

/// Per-build state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Present,
    Missing,
    /// Waiting for requirements.
    Pending,
    /// Handed to the executor.
    Running,
    Succeeded,
    Failed,
    /// A requirement ended missing, failed or blocked; never run.
    Blocked,
}

impl From<NodeClass> for RunState {
    fn from(class: NodeClass) -> Self {
        match class {
            NodeClass::Present => RunState::Present,
            NodeClass::Missing => RunState::Missing,
            NodeClass::Pending => RunState::Pending,
        }
    }
}

impl RunState {
    /// The node's artifact exists at this point of the build.
    pub fn is_satisfied(self) -> bool {
        matches!(self, RunState::Present | RunState::Succeeded)
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }

    /// Terminal without an artifact; dependents can never run.
    pub fn is_unsatisfiable(self) -> bool {
        matches!(
            self,
            RunState::Missing | RunState::Failed | RunState::Blocked
        )
    }
}

/// Outcome of a single run attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}
