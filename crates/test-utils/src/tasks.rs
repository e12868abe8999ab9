//! Task types shared by the integration tests.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use lazydag::errors::DomainError;
use lazydag::target::{MemoryStore, Target};
use lazydag::task::{inputs, Runnable, Task, TaskContext, TaskId, TaskRef};

#[derive(Error, Debug)]
#[error("dummy failure")]
pub struct DummyError;

/// Task without output whose body fails when `fail` is set.
#[derive(Debug)]
pub struct EmptyTask {
    id: TaskId,
    fail: bool,
}

impl EmptyTask {
    pub const FAMILY: &'static str = "EmptyTask";

    pub fn new(fail: bool) -> Self {
        Self {
            id: TaskId::new(Self::FAMILY).with_param("fail", fail),
            fail,
        }
    }

    pub fn shared(fail: bool) -> TaskRef {
        Arc::new(Self::new(fail))
    }
}

impl Task for EmptyTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn body(&self) -> Option<&dyn Runnable> {
        Some(self)
    }
}

impl Runnable for EmptyTask {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(DummyError));
        }
        Ok(())
    }
}

pub const FOO_EVENT: &str = "foo event";

/// Task whose body publishes [`FOO_EVENT`] with a single `&str` payload.
#[derive(Debug)]
pub struct TaskWithCallback {
    id: TaskId,
}

impl TaskWithCallback {
    pub const FAMILY: &'static str = "TaskWithCallback";

    pub fn shared() -> TaskRef {
        Arc::new(Self {
            id: TaskId::new(Self::FAMILY),
        })
    }
}

impl Task for TaskWithCallback {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn body(&self) -> Option<&dyn Runnable> {
        Some(self)
    }
}

impl Runnable for TaskWithCallback {
    fn run(&self, ctx: &TaskContext<'_>) -> Result<(), DomainError> {
        let payload: [&dyn Any; 1] = [&"foo"];
        ctx.trigger_event(FOO_EVENT, &payload)?;
        Ok(())
    }
}

/// Tag shared by the runnable families `A`, `B` and `C`.
pub const HAPPY_TAG: &str = "HappyTestFriend";
/// Tag shared by every family whose output is derived from its id.
pub const MOCK_OUTPUT_TAG: &str = "ConsistentMockOutput";

const HAPPY_ANCESTORS: &[&str] = &[HAPPY_TAG, MOCK_OUTPUT_TAG];
const EXTERNAL_ANCESTORS: &[&str] = &[MOCK_OUTPUT_TAG];

/// Families of the four-level graph:
///
/// ```text
///        A
///      /   \
///    B(1)  B(2)
///     |     |
///    C(1)  C(2)
///     |  \  |  \
///    D(1)  D(2)  D(3)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    A,
    B,
    C,
    D,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::A => "A",
            Family::B => "B",
            Family::C => "C",
            Family::D => "D",
        }
    }
}

/// Task whose output lives in a [`MemoryStore`] at `/<Family>/<param>` and
/// contains its id followed by the sorted contents of its inputs, e.g.
/// `[C(param=1), [D(param=1)], [D(param=2)]]`.
///
/// `D` is external; the other families run by producing that output.
#[derive(Debug)]
pub struct FamilyTask {
    family: Family,
    param: i64,
    id: TaskId,
    store: MemoryStore,
}

impl FamilyTask {
    pub fn new(family: Family, param: i64, store: &MemoryStore) -> Self {
        Self {
            family,
            param,
            id: TaskId::new(family.name()).with_param("param", param),
            store: store.clone(),
        }
    }

    pub fn shared(family: Family, param: i64, store: &MemoryStore) -> TaskRef {
        Arc::new(Self::new(family, param, store))
    }

    pub fn path(family: Family, param: i64) -> String {
        format!("/{}/{}", family.name(), param)
    }

    fn target(&self) -> Target {
        Target::new(
            Arc::new(self.store.clone()),
            Self::path(self.family, self.param),
        )
    }

    /// Write the output from the current contents of the inputs.
    pub fn produce_output(&self) -> Result<()> {
        let mut contents = inputs(self)
            .iter()
            .map(Target::read_to_string)
            .collect::<Result<Vec<_>>>()?;
        contents.sort();

        let mut rendered = format!("[{}", self.id);
        for content in contents {
            rendered.push_str(", ");
            rendered.push_str(&content);
        }
        rendered.push(']');

        self.target().write_with(|w| {
            use std::io::Write;
            w.write_all(rendered.as_bytes())?;
            Ok(())
        })
    }
}

impl Task for FamilyTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn ancestors(&self) -> &[&str] {
        match self.family {
            Family::D => EXTERNAL_ANCESTORS,
            _ => HAPPY_ANCESTORS,
        }
    }

    fn requires(&self) -> Vec<TaskRef> {
        let store = &self.store;
        match self.family {
            Family::A => vec![
                FamilyTask::shared(Family::B, 1, store),
                FamilyTask::shared(Family::B, 2, store),
            ],
            Family::B => vec![FamilyTask::shared(Family::C, self.param, store)],
            Family::C => vec![
                FamilyTask::shared(Family::D, self.param, store),
                FamilyTask::shared(Family::D, self.param + 1, store),
            ],
            Family::D => Vec::new(),
        }
    }

    fn output(&self) -> Option<Target> {
        Some(self.target())
    }

    fn body(&self) -> Option<&dyn Runnable> {
        match self.family {
            Family::D => None,
            _ => Some(self),
        }
    }
}

impl Runnable for FamilyTask {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<(), DomainError> {
        self.produce_output().map_err(DomainError::from)
    }
}

/// How a [`CountingTask`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Already complete.
    Present,
    /// Incomplete and without a body.
    External,
    /// Incomplete with a body that succeeds.
    Succeeds,
    /// Incomplete with a body that fails.
    Fails,
}

/// Task that counts completion checks and body runs.
#[derive(Debug)]
pub struct CountingTask {
    id: TaskId,
    kind: NodeKind,
    deps: Vec<TaskRef>,
    complete_checks: AtomicUsize,
    runs: AtomicUsize,
}

impl CountingTask {
    pub fn complete_checks(&self) -> usize {
        self.complete_checks.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

impl Task for CountingTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn requires(&self) -> Vec<TaskRef> {
        self.deps.clone()
    }

    fn complete(&self) -> Result<bool> {
        self.complete_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.kind == NodeKind::Present)
    }

    fn body(&self) -> Option<&dyn Runnable> {
        match self.kind {
            NodeKind::External => None,
            _ => Some(self),
        }
    }
}

impl Runnable for CountingTask {
    fn run(&self, _ctx: &TaskContext<'_>) -> Result<(), DomainError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.kind {
            NodeKind::Fails => Err(DomainError::new(DummyError)),
            _ => Ok(()),
        }
    }
}

/// A DAG of [`CountingTask`]s built in index order.
///
/// Node `i` may only require nodes with a smaller index, so the graph is
/// acyclic by construction.
#[derive(Debug, Default)]
pub struct CountingGraph {
    nodes: Vec<Arc<CountingTask>>,
}

impl CountingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node `N(i=<index>)` requiring `deps` (indices of earlier nodes).
    pub fn add(&mut self, kind: NodeKind, deps: &[usize]) -> usize {
        let index = self.nodes.len();
        let deps = deps
            .iter()
            .map(|&d| Arc::clone(&self.nodes[d]) as TaskRef)
            .collect();
        self.nodes.push(Arc::new(CountingTask {
            id: TaskId::new("N").with_param("i", index),
            kind,
            deps,
            complete_checks: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
        }));
        index
    }

    pub fn node(&self, index: usize) -> &Arc<CountingTask> {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Arc<CountingTask>] {
        &self.nodes
    }

    pub fn task(&self, index: usize) -> TaskRef {
        Arc::clone(&self.nodes[index]) as TaskRef
    }
}
