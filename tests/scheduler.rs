// tests/scheduler.rs

mod common;

use std::collections::HashSet;

use lazydag::dag::{NodeClass, Resolver, RunState, Scheduler, TaskOutcome};
use lazydag::events::EventBus;
use lazydag::task::TaskId;
use lazydag_test_utils::tasks::{CountingGraph, NodeKind};

fn n(i: usize) -> TaskId {
    TaskId::new("N").with_param("i", i)
}

/// ```text
///   0 <- 1 <- 2
///   ^
///   +--- 3
/// ```
fn chain() -> CountingGraph {
    let mut graph = CountingGraph::new();
    graph.add(NodeKind::Succeeds, &[]);
    graph.add(NodeKind::Succeeds, &[0]);
    graph.add(NodeKind::Succeeds, &[1]);
    graph.add(NodeKind::Succeeds, &[0]);
    graph
}

fn scheduler_for(graph: &CountingGraph, roots: &[usize]) -> Scheduler {
    let bus = EventBus::new();
    let roots: Vec<_> = roots.iter().map(|&i| graph.task(i)).collect();
    let resolution = Resolver::new(&bus).resolve(&roots).unwrap();
    Scheduler::from_resolution(resolution).unwrap()
}

#[test]
fn test_resolution_classifies_nodes() {
    let mut graph = CountingGraph::new();
    graph.add(NodeKind::Present, &[]);
    graph.add(NodeKind::External, &[]);
    graph.add(NodeKind::Succeeds, &[0, 1]);

    let bus = EventBus::new();
    let resolution = Resolver::new(&bus).resolve(&[graph.task(2)]).unwrap();

    assert_eq!(resolution.class_of(&n(0)), Some(NodeClass::Present));
    assert_eq!(resolution.class_of(&n(1)), Some(NodeClass::Missing));
    assert_eq!(resolution.class_of(&n(2)), Some(NodeClass::Pending));
    assert_eq!(resolution.with_class(NodeClass::Pending), vec![n(2)]);
    assert_eq!(resolution.graph.edge_count(), 2);
    assert_eq!(resolution.roots, vec![n(2)]);
}

#[test]
fn test_next_ready_waits_for_requirements() {
    common::init_tracing();
    let graph = chain();
    let mut scheduler = scheduler_for(&graph, &[2, 3]);

    let first = scheduler.next_ready().unwrap();
    assert_eq!(first.id(), &n(0));
    assert_eq!(scheduler.run_state_of(&n(0)), Some(RunState::Running));
    assert!(scheduler.next_ready().is_none());
    assert_eq!(scheduler.deps_satisfied(&n(1)), Some(false));

    let step = scheduler.handle_completion(&n(0), TaskOutcome::Success);
    assert!(step.newly_blocked.is_empty());
    assert!(!step.build_finished);
    assert_eq!(scheduler.deps_satisfied(&n(1)), Some(true));

    let mut ran = vec![n(0)];
    while let Some(task) = scheduler.next_ready() {
        let id = task.id().clone();
        scheduler.handle_completion(&id, TaskOutcome::Success);
        ran.push(id);
    }

    assert!(scheduler.is_finished());
    assert_eq!(ran.len(), 4);
    let pos = |id: &TaskId| ran.iter().position(|r| r == id).unwrap();
    assert!(pos(&n(1)) < pos(&n(2)));
    assert!(scheduler
        .states()
        .values()
        .all(|s| *s == RunState::Succeeded));
}

#[test]
fn test_failure_blocks_transitive_dependents() {
    common::init_tracing();
    let graph = chain();
    let mut scheduler = scheduler_for(&graph, &[2, 3]);

    let first = scheduler.next_ready().unwrap();
    let step = scheduler.handle_completion(first.id(), TaskOutcome::Failed);

    let blocked: HashSet<TaskId> = step.newly_blocked.into_iter().collect();
    assert_eq!(blocked, [n(1), n(2), n(3)].into_iter().collect());
    assert!(step.build_finished);
    assert!(scheduler.next_ready().is_none());
    assert_eq!(scheduler.run_state_of(&n(0)), Some(RunState::Failed));
}

#[test]
fn test_missing_requirement_blocks_on_next_ready() {
    common::init_tracing();
    let mut graph = CountingGraph::new();
    graph.add(NodeKind::External, &[]);
    graph.add(NodeKind::Succeeds, &[]);
    graph.add(NodeKind::Succeeds, &[0, 1]);
    let mut scheduler = scheduler_for(&graph, &[2]);

    let ready = scheduler.next_ready().unwrap();
    assert_eq!(ready.id(), &n(1));
    scheduler.handle_completion(&n(1), TaskOutcome::Success);

    assert!(scheduler.next_ready().is_none());
    assert_eq!(scheduler.run_state_of(&n(2)), Some(RunState::Blocked));
    assert_eq!(scheduler.run_state_of(&n(0)), Some(RunState::Missing));
    assert!(scheduler.is_finished());
}

#[test]
fn test_completion_for_idle_task_is_ignored() {
    let graph = chain();
    let mut scheduler = scheduler_for(&graph, &[2]);

    let step = scheduler.handle_completion(&n(2), TaskOutcome::Success);
    assert!(step.newly_blocked.is_empty());
    assert_eq!(scheduler.run_state_of(&n(2)), Some(RunState::Pending));

    scheduler.handle_completion(&TaskId::new("Unknown"), TaskOutcome::Failed);
    assert_eq!(scheduler.deps_satisfied(&TaskId::new("Unknown")), None);
    assert_eq!(scheduler.roots(), &[n(2)]);
}
