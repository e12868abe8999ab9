// src/dag/resolver.rs

//! Lazy dependency resolution.
//!
//! Walks the graph depth-first from the roots, asking each task whether it
//! is complete and, if not, what it requires. Every node is classified
//! exactly once per resolution (see [`NodeClass`]); the memo is keyed by
//! [`TaskId`].
//!
//! Events, in order:
//! - `DependencyPresent(node)` when a node's artifact already exists; its
//!   requirements are not explored.
//! - `DependencyMissing(node)` when a node is incomplete and has no run body.
//! - `DependencyDiscovered(node, dep)` for every requirement of an
//!   incomplete runnable node, emitted right before recursing into `dep`.
//!
//! PRESENT/MISSING fire once per node even when it is reached through
//! several parents; DISCOVERED fires once per incoming edge.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::dag::graph::ResolvedGraph;
use crate::dag::state::NodeClass;
use crate::errors::{GraphError, LazydagError, ResolutionError, Result};
use crate::events::{Event, EventBus};
use crate::task::{TaskId, TaskRef};

/// Result of resolving a set of roots.
#[derive(Debug)]
pub struct Resolution {
    pub graph: ResolvedGraph,
    pub classes: HashMap<TaskId, NodeClass>,
    pub roots: Vec<TaskId>,
}

impl Resolution {
    pub fn class_of(&self, id: &TaskId) -> Option<NodeClass> {
        self.classes.get(id).copied()
    }

    /// Ids with the given classification.
    pub fn with_class(&self, class: NodeClass) -> Vec<TaskId> {
        self.graph
            .ids()
            .filter(|id| self.classes.get(*id) == Some(&class))
            .cloned()
            .collect()
    }
}

pub struct Resolver<'a> {
    bus: &'a EventBus,
    graph: ResolvedGraph,
    classes: HashMap<TaskId, NodeClass>,
    /// Current DFS path, for cycle detection.
    path: Vec<TaskId>,
}

impl<'a> Resolver<'a> {
    pub fn new(bus: &'a EventBus) -> Self {
        Self {
            bus,
            graph: ResolvedGraph::new(),
            classes: HashMap::new(),
            path: Vec::new(),
        }
    }

    /// Resolve every root, sharing one memo across all of them.
    ///
    /// Errors:
    /// - [`LazydagError::Resolution`] if a completion check fails.
    /// - [`LazydagError::Graph`] on a dependency cycle.
    /// - [`LazydagError::Handler`] if a handler fails under the propagate policy.
    pub fn resolve(mut self, roots: &[TaskRef]) -> Result<Resolution> {
        for root in roots {
            self.visit(root)?;
        }

        debug!(
            nodes = self.graph.len(),
            edges = self.graph.edge_count(),
            "resolution finished"
        );

        Ok(Resolution {
            graph: self.graph,
            classes: self.classes,
            roots: roots.iter().map(|r| r.id().clone()).collect(),
        })
    }

    fn visit(&mut self, task: &TaskRef) -> Result<NodeClass> {
        let id = task.id();

        if let Some(class) = self.classes.get(id) {
            trace!(task = %id, ?class, "already visited");
            return Ok(*class);
        }

        if let Some(pos) = self.path.iter().position(|p| p == id) {
            let mut cycle: Vec<String> = self.path[pos..].iter().map(|p| p.to_string()).collect();
            cycle.push(id.to_string());
            return Err(GraphError::Cycle(cycle).into());
        }

        let complete = task.complete().map_err(|source| {
            LazydagError::Resolution(ResolutionError {
                task: id.clone(),
                source,
            })
        })?;

        self.graph.add_node(task);

        if complete {
            debug!(task = %id, "output present");
            self.classes.insert(id.clone(), NodeClass::Present);
            self.bus.emit(&Event::DependencyPresent { task: task.as_ref() })?;
            return Ok(NodeClass::Present);
        }

        if task.body().is_none() {
            debug!(task = %id, "external task incomplete; missing");
            self.classes.insert(id.clone(), NodeClass::Missing);
            self.bus.emit(&Event::DependencyMissing { task: task.as_ref() })?;
            return Ok(NodeClass::Missing);
        }

        self.path.push(id.clone());
        for dep in task.requires() {
            self.bus.emit(&Event::DependencyDiscovered {
                task: task.as_ref(),
                dependency: dep.as_ref(),
            })?;
            self.visit(&dep)?;
            self.graph.add_edge(dep.id(), id);
        }
        self.path.pop();

        debug!(task = %id, "incomplete; pending");
        self.classes.insert(id.clone(), NodeClass::Pending);
        Ok(NodeClass::Pending)
    }
}
