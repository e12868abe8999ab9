use std::sync::{Arc, Mutex};
use std::time::Duration;

use lazydag::events::{Event, EventBus, EventKind, Subscriber};

/// One observed event, flattened to owned strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub kind: EventKind,
    pub task: String,
    pub dependency: Option<String>,
    pub elapsed: Option<Duration>,
    pub error: Option<String>,
}

/// Records every event a bus dispatches for a subscriber, in order.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    entries: Arc<Mutex<Vec<Recorded>>>,
}

impl EventRecorder {
    /// Record every lifecycle event on every task.
    pub fn attach(bus: &EventBus) -> Self {
        Self::attach_to(bus, Subscriber::AnyTask)
    }

    /// Record lifecycle events for tasks matching `subscriber`.
    pub fn attach_to(bus: &EventBus, subscriber: Subscriber) -> Self {
        let recorder = Self::default();
        let entries = Arc::clone(&recorder.entries);
        bus.register_lifecycle(subscriber, move |event| {
            entries.lock().unwrap().push(flatten(event));
            Ok(())
        });
        recorder
    }

    /// Additionally record custom events named `name`.
    pub fn also_custom(&self, bus: &EventBus, subscriber: Subscriber, name: &str) {
        let entries = Arc::clone(&self.entries);
        bus.register(subscriber, EventKind::custom(name), move |event| {
            entries.lock().unwrap().push(flatten(event));
            Ok(())
        });
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Tasks that received `kind`, in dispatch order.
    pub fn tasks_for(&self, kind: &EventKind) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| &e.kind == kind)
            .map(|e| e.task)
            .collect()
    }

    /// `(task, dependency)` pairs from DEPENDENCY_DISCOVERED, in dispatch order.
    pub fn discovered(&self) -> Vec<(String, String)> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind == EventKind::DependencyDiscovered)
            .filter_map(|e| e.dependency.map(|dep| (e.task, dep)))
            .collect()
    }

    /// Event kinds seen for one task, in dispatch order.
    pub fn kinds_for(&self, task: &str) -> Vec<EventKind> {
        self.entries()
            .into_iter()
            .filter(|e| e.task == task)
            .map(|e| e.kind)
            .collect()
    }

    pub fn count(&self, kind: &EventKind) -> usize {
        self.entries().iter().filter(|e| &e.kind == kind).count()
    }
}

fn flatten(event: &Event<'_>) -> Recorded {
    let mut recorded = Recorded {
        kind: event.kind(),
        task: event.task().id().to_string(),
        dependency: None,
        elapsed: None,
        error: None,
    };
    match *event {
        Event::DependencyDiscovered { dependency, .. } => {
            recorded.dependency = Some(dependency.id().to_string());
        }
        Event::ProcessingTime { elapsed, .. } => recorded.elapsed = Some(elapsed),
        Event::Failure { error, .. } => recorded.error = Some(error.to_string()),
        _ => {}
    }
    recorded
}
