// tests/dependency_events.rs

mod common;

use std::collections::HashSet;

use lazydag::dag::RunState;
use lazydag::events::EventKind;
use lazydag::target::MemoryStore;
use lazydag::task::TaskId;
use lazydag_test_utils::recorder::EventRecorder;
use lazydag_test_utils::tasks::{Family, FamilyTask};

fn seed_d(store: &MemoryStore, params: std::ops::RangeInclusive<i64>) {
    for param in params {
        FamilyTask::new(Family::D, param, store)
            .produce_output()
            .unwrap();
    }
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> HashSet<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

fn expected_discovered() -> HashSet<(String, String)> {
    pairs(&[
        ("A(param=1)", "B(param=1)"),
        ("A(param=1)", "B(param=2)"),
        ("B(param=1)", "C(param=1)"),
        ("B(param=2)", "C(param=2)"),
        ("C(param=1)", "D(param=1)"),
        ("C(param=1)", "D(param=2)"),
        ("C(param=2)", "D(param=2)"),
        ("C(param=2)", "D(param=3)"),
    ])
}

fn id(family: &str, param: i64) -> TaskId {
    TaskId::new(family).with_param("param", param)
}

#[test]
fn test_incomplete_dag() {
    common::init_tracing();
    let store = MemoryStore::new();
    seed_d(&store, 1..=2);

    let bus = common::new_bus();
    let recorder = EventRecorder::attach(&bus);
    let root = FamilyTask::shared(Family::A, 1, &store);

    let report = common::build_local(&[root.clone()], &bus);

    let discovered: HashSet<_> = recorder.discovered().into_iter().collect();
    assert_eq!(discovered, expected_discovered());
    assert_eq!(
        recorder
            .tasks_for(&EventKind::DependencyMissing)
            .into_iter()
            .collect::<HashSet<_>>(),
        set(&["D(param=3)"])
    );
    assert_eq!(
        recorder
            .tasks_for(&EventKind::DependencyPresent)
            .into_iter()
            .collect::<HashSet<_>>(),
        set(&["D(param=1)", "D(param=2)"])
    );

    assert!(!report.success());
    assert_eq!(report.failed_roots(), vec![root.id()]);
    assert!(!root.output().unwrap().exists().unwrap());

    // The branch that only needs D(1) and D(2) still gets built.
    assert_eq!(report.state_of(&id("C", 1)), Some(RunState::Succeeded));
    assert_eq!(report.state_of(&id("B", 1)), Some(RunState::Succeeded));
    assert_eq!(report.state_of(&id("C", 2)), Some(RunState::Blocked));
    assert_eq!(report.state_of(&id("B", 2)), Some(RunState::Blocked));
    assert_eq!(report.state_of(&id("A", 1)), Some(RunState::Blocked));
    assert_eq!(report.missing_tasks(), vec![&id("D", 3)]);
    assert!(report.failed_tasks().is_empty());
}

#[test]
fn test_complete_dag() {
    common::init_tracing();
    let store = MemoryStore::new();
    seed_d(&store, 1..=3);

    let bus = common::new_bus();
    let recorder = EventRecorder::attach(&bus);
    let root = FamilyTask::shared(Family::A, 1, &store);

    let report = common::build_local(&[root.clone()], &bus);

    let discovered: HashSet<_> = recorder.discovered().into_iter().collect();
    assert_eq!(discovered, expected_discovered());
    assert_eq!(recorder.count(&EventKind::DependencyMissing), 0);
    assert_eq!(
        recorder
            .tasks_for(&EventKind::DependencyPresent)
            .into_iter()
            .collect::<HashSet<_>>(),
        set(&["D(param=1)", "D(param=2)", "D(param=3)"])
    );

    assert!(report.success());
    assert!(report.roots[0].output_exists);
    assert_eq!(
        root.output().unwrap().read_to_string().unwrap(),
        "[A(param=1), [B(param=1), [C(param=1), [D(param=1)], [D(param=2)]]], \
         [B(param=2), [C(param=2), [D(param=2)], [D(param=3)]]]]"
    );
}

#[test]
fn test_shared_dependency_is_classified_once() {
    common::init_tracing();
    let store = MemoryStore::new();
    seed_d(&store, 1..=3);

    let bus = common::new_bus();
    let recorder = EventRecorder::attach(&bus);
    common::build_local(&[FamilyTask::shared(Family::A, 1, &store)], &bus);

    // D(2) is reached from C(1) and C(2): two edges, one classification.
    let into_d2 = recorder
        .discovered()
        .into_iter()
        .filter(|(_, dep)| dep == "D(param=2)")
        .count();
    assert_eq!(into_d2, 2);
    assert_eq!(recorder.tasks_for(&EventKind::DependencyPresent).len(), 3);
}

#[test]
fn test_discovered_precedes_classification_of_dependency() {
    common::init_tracing();
    let store = MemoryStore::new();
    seed_d(&store, 1..=2);

    let bus = common::new_bus();
    let recorder = EventRecorder::attach(&bus);
    common::build_local(&[FamilyTask::shared(Family::C, 1, &store)], &bus);

    let entries = recorder.entries();
    let discovered_d1 = entries
        .iter()
        .position(|e| {
            e.kind == EventKind::DependencyDiscovered
                && e.dependency.as_deref() == Some("D(param=1)")
        })
        .unwrap();
    let present_d1 = entries
        .iter()
        .position(|e| e.kind == EventKind::DependencyPresent && e.task == "D(param=1)")
        .unwrap();
    let start_c1 = entries
        .iter()
        .position(|e| e.kind == EventKind::Start && e.task == "C(param=1)")
        .unwrap();

    assert!(discovered_d1 < present_d1);
    assert!(present_d1 < start_c1);
}

#[test]
fn test_present_root_is_not_explored_or_run() {
    common::init_tracing();
    let store = MemoryStore::new();
    store.add_file(FamilyTask::path(Family::B, 1), "[B(param=1)]");

    let bus = common::new_bus();
    let recorder = EventRecorder::attach(&bus);
    let report = common::build_local(&[FamilyTask::shared(Family::B, 1, &store)], &bus);

    assert!(report.success());
    assert!(report.ran.is_empty());
    assert!(recorder.discovered().is_empty());
    assert_eq!(
        recorder.tasks_for(&EventKind::DependencyPresent),
        vec!["B(param=1)"]
    );
}

#[test]
fn test_second_build_finds_outputs_of_first() {
    common::init_tracing();
    let store = MemoryStore::new();
    seed_d(&store, 1..=3);
    let bus = common::new_bus();

    let first = common::build_local(&[FamilyTask::shared(Family::A, 1, &store)], &bus);
    assert_eq!(first.ran.len(), 5);

    let recorder = EventRecorder::attach(&bus);
    let second = common::build_local(&[FamilyTask::shared(Family::A, 1, &store)], &bus);
    assert!(second.success());
    assert!(second.ran.is_empty());
    assert_eq!(
        recorder.tasks_for(&EventKind::DependencyPresent),
        vec!["A(param=1)"]
    );
}
