// src/events/bus.rs

//! Handler registry and synchronous dispatch.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{trace, warn};

use crate::errors::HandlerError;
use crate::events::{Event, EventKind, HandlerErrorPolicy};
use crate::task::{is_instance_of, Task};

/// Callback invoked for a matching event.
pub type Handler = Arc<dyn Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Which tasks a handler observes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// Every task (the root task type).
    AnyTask,
    /// Tasks whose family or one of whose ancestors equals this tag.
    Type(String),
}

impl Subscriber {
    pub fn of(tag: impl Into<String>) -> Self {
        Subscriber::Type(tag.into())
    }

    pub fn matches(&self, task: &dyn Task) -> bool {
        match self {
            Subscriber::AnyTask => true,
            Subscriber::Type(tag) => is_instance_of(task, tag),
        }
    }
}

struct Registration {
    subscriber: Subscriber,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct BusState {
    registrations: Vec<Registration>,
    policy: HandlerErrorPolicy,
}

/// Registry of event handlers keyed by (subscriber, event kind).
///
/// Registration is additive and lives as long as the bus; share it between
/// builds with an `Arc`. Dispatch is synchronous, on the emitting thread,
/// in registration order, and calls every handler whose subscriber matches
/// the task (not only the most specific one).
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("EventBus")
            .field("handlers", &state.registrations.len())
            .field("policy", &state.policy)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: HandlerErrorPolicy) -> Self {
        let bus = Self::default();
        bus.set_policy(policy);
        bus
    }

    pub fn policy(&self) -> HandlerErrorPolicy {
        self.lock().policy
    }

    pub fn set_policy(&self, policy: HandlerErrorPolicy) {
        self.lock().policy = policy;
    }

    /// Add a handler for `kind` on tasks matching `subscriber`.
    pub fn register<F>(&self, subscriber: Subscriber, kind: EventKind, handler: F)
    where
        F: Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        trace!(?subscriber, event = %kind, "registering event handler");
        self.lock().registrations.push(Registration {
            subscriber,
            kind,
            handler: Arc::new(handler),
        });
    }

    /// Register the same handler for every lifecycle event kind.
    pub fn register_lifecycle<F>(&self, subscriber: Subscriber, handler: F)
    where
        F: Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let mut state = self.lock();
        for kind in EventKind::LIFECYCLE {
            state.registrations.push(Registration {
                subscriber: subscriber.clone(),
                kind,
                handler: Arc::clone(&handler),
            });
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.lock().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration. The error policy is kept.
    pub fn reset(&self) {
        self.lock().registrations.clear();
    }

    /// Dispatch an event to every matching handler.
    ///
    /// With [`HandlerErrorPolicy::Propagate`] the first failing handler
    /// aborts this emission and its error is returned. With
    /// [`HandlerErrorPolicy::Isolate`] failures are logged at warn and
    /// dispatch continues. This is the only library-side warn; the error
    /// would otherwise go unreported.
    pub fn emit(&self, event: &Event<'_>) -> Result<(), HandlerError> {
        let task = event.task();

        // Snapshot matching handlers so they may register new ones.
        let (handlers, policy) = {
            let state = self.lock();
            let handlers: Vec<Handler> = state
                .registrations
                .iter()
                .filter(|r| event.is(&r.kind) && r.subscriber.matches(task))
                .map(|r| Arc::clone(&r.handler))
                .collect();
            (handlers, state.policy)
        };

        trace!(
            event = %event.kind(),
            task = %task.id(),
            handlers = handlers.len(),
            "emitting event"
        );

        for handler in handlers {
            if let Err(source) = handler(event) {
                let err = HandlerError {
                    event: event.kind().to_string(),
                    source,
                };
                match policy {
                    HandlerErrorPolicy::Propagate => return Err(err),
                    HandlerErrorPolicy::Isolate => {
                        warn!(task = %task.id(), error = %err, "event handler failed; continuing");
                    }
                }
            }
        }

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        // Registrations stay consistent even if a previous holder panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
