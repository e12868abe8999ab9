// src/events/mod.rs

//! Event subscription and dispatch.
//!
//! - [`kind`] defines the event identifiers and payloads.
//! - [`bus`] holds the handler registry ([`EventBus`]) and dispatch.
//!
//! Lifecycle events are emitted by the resolver and executor; custom
//! events are emitted by task bodies through
//! [`TaskContext::trigger_event`](crate::task::TaskContext::trigger_event).

pub mod bus;
pub mod kind;

pub use bus::{EventBus, Handler, Subscriber};
pub use kind::{Event, EventKind};
pub use crate::types::HandlerErrorPolicy;
