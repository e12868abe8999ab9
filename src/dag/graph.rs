// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors::GraphError;
use crate::task::{TaskId, TaskRef};

/// The part of the task graph materialized by one resolution.
///
/// Edge direction: requirement -> dependent. Requirements of present or
/// missing nodes are never added, since the resolver does not explore them.
#[derive(Debug, Default)]
pub struct ResolvedGraph {
    graph: DiGraph<TaskRef, ()>,
    index: HashMap<TaskId, NodeIndex>,
}

impl ResolvedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if not already present.
    pub fn add_node(&mut self, task: &TaskRef) -> NodeIndex {
        if let Some(idx) = self.index.get(task.id()) {
            return *idx;
        }
        let idx = self.graph.add_node(TaskRef::clone(task));
        self.index.insert(task.id().clone(), idx);
        idx
    }

    /// Record that `dependent` requires `requirement`. Both must be known.
    pub fn add_edge(&mut self, requirement: &TaskId, dependent: &TaskId) {
        if let (Some(&from), Some(&to)) = (self.index.get(requirement), self.index.get(dependent)) {
            self.graph.update_edge(from, to, ());
        }
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&TaskRef> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All task ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.graph.node_indices().map(|idx| self.graph[idx].id())
    }

    /// Immediate requirements recorded for a task.
    pub fn dependencies_of(&self, id: &TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Immediate dependents recorded for a task.
    pub fn dependents_of(&self, id: &TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Requirements before dependents.
    pub fn topological_order(&self) -> Result<Vec<TaskId>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|idx| self.graph[idx].id().clone())
                .collect()),
            Err(cycle) => Err(GraphError::Cycle(vec![
                self.graph[cycle.node_id()].id().to_string(),
            ])),
        }
    }

    fn neighbors(&self, id: &TaskId, dir: Direction) -> Vec<TaskId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<TaskId> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].id().clone())
            .collect();
        // petgraph yields neighbors newest-edge first.
        ids.reverse();
        ids
    }
}
