// src/events/kind.rs

use std::any::Any;
use std::fmt;
use std::time::Duration;

use crate::errors::DomainError;
use crate::task::Task;

/// Identifier of an event: a fixed lifecycle kind or a custom name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Success,
    Failure,
    ProcessingTime,
    DependencyDiscovered,
    DependencyMissing,
    DependencyPresent,
    /// Event triggered explicitly by a running task body.
    Custom(String),
}

impl EventKind {
    pub const LIFECYCLE: [EventKind; 7] = [
        EventKind::Start,
        EventKind::Success,
        EventKind::Failure,
        EventKind::ProcessingTime,
        EventKind::DependencyDiscovered,
        EventKind::DependencyMissing,
        EventKind::DependencyPresent,
    ];

    pub fn custom(name: impl Into<String>) -> Self {
        EventKind::Custom(name.into())
    }

    /// Dot-namespaced identifier, e.g. `event.core.start`.
    ///
    /// Custom events use their caller-chosen name verbatim.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Start => "event.core.start",
            EventKind::Success => "event.core.success",
            EventKind::Failure => "event.core.failure",
            EventKind::ProcessingTime => "event.core.processing_time",
            EventKind::DependencyDiscovered => "event.core.dependency.discovered",
            EventKind::DependencyMissing => "event.core.dependency.missing",
            EventKind::DependencyPresent => "event.core.dependency.present",
            EventKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event together with its payload.
///
/// `task` is always the instance the event is about; dispatch matches
/// subscribers against its type tags.
#[derive(Clone, Copy)]
pub enum Event<'a> {
    Start {
        task: &'a dyn Task,
    },
    Success {
        task: &'a dyn Task,
    },
    Failure {
        task: &'a dyn Task,
        error: &'a DomainError,
    },
    ProcessingTime {
        task: &'a dyn Task,
        elapsed: Duration,
    },
    /// Edge `task -> dependency` seen while walking the graph.
    DependencyDiscovered {
        task: &'a dyn Task,
        dependency: &'a dyn Task,
    },
    DependencyMissing {
        task: &'a dyn Task,
    },
    DependencyPresent {
        task: &'a dyn Task,
    },
    Custom {
        task: &'a dyn Task,
        name: &'a str,
        payload: &'a [&'a dyn Any],
    },
}

impl<'a> Event<'a> {
    pub fn task(&self) -> &'a dyn Task {
        match *self {
            Event::Start { task }
            | Event::Success { task }
            | Event::Failure { task, .. }
            | Event::ProcessingTime { task, .. }
            | Event::DependencyDiscovered { task, .. }
            | Event::DependencyMissing { task }
            | Event::DependencyPresent { task }
            | Event::Custom { task, .. } => task,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start { .. } => EventKind::Start,
            Event::Success { .. } => EventKind::Success,
            Event::Failure { .. } => EventKind::Failure,
            Event::ProcessingTime { .. } => EventKind::ProcessingTime,
            Event::DependencyDiscovered { .. } => EventKind::DependencyDiscovered,
            Event::DependencyMissing { .. } => EventKind::DependencyMissing,
            Event::DependencyPresent { .. } => EventKind::DependencyPresent,
            Event::Custom { name, .. } => EventKind::Custom((*name).to_string()),
        }
    }

    /// Whether this event is of the given kind, without allocating.
    pub fn is(&self, kind: &EventKind) -> bool {
        match (self, kind) {
            (Event::Custom { name, .. }, EventKind::Custom(k)) => *name == k.as_str(),
            (Event::Custom { .. }, _) | (_, EventKind::Custom(_)) => false,
            _ => self.kind() == *kind,
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Event");
        s.field("kind", &self.kind().as_str())
            .field("task", &self.task().id().to_string());
        match self {
            Event::Failure { error, .. } => {
                s.field("error", &error.to_string());
            }
            Event::ProcessingTime { elapsed, .. } => {
                s.field("elapsed", elapsed);
            }
            Event::DependencyDiscovered { dependency, .. } => {
                s.field("dependency", &dependency.id().to_string());
            }
            Event::Custom { payload, .. } => {
                s.field("payload_len", &payload.len());
            }
            _ => {}
        }
        s.finish()
    }
}
