// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use lazydag::engine::{build, BuildOptions, BuildReport};
use lazydag::events::EventBus;
use lazydag::task::TaskRef;

pub use lazydag_test_utils::init_tracing;

/// Fresh bus with the default (propagate) policy.
pub fn new_bus() -> Arc<EventBus> {
    Arc::new(EventBus::new())
}

/// Run a local build, panicking on fatal errors.
pub fn build_local(roots: &[TaskRef], bus: &Arc<EventBus>) -> BuildReport {
    build(roots, &BuildOptions::local(), Arc::clone(bus)).expect("build should not fail fatally")
}
