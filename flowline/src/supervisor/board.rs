//! Shared read-only view of node states.

use super::state::NodeState;
use dashmap::DashMap;
use std::collections::HashMap;

/// Concurrent registry of the last observed state of every node.
///
/// Each node's supervisor task writes its own entry; readers (operators,
/// health checks, tests) observe without blocking the state machines. The
/// board carries state snapshots only, never counters.
#[derive(Debug, Default)]
pub struct StatusBoard {
    states: DashMap<String, NodeState>,
}

impl StatusBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state of a node.
    pub fn set(&self, node_id: &str, state: NodeState) {
        self.states.insert(node_id.to_string(), state);
    }

    /// Returns the last observed state of a node.
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<NodeState> {
        self.states.get(node_id).map(|entry| *entry.value())
    }

    /// Returns a point-in-time copy of every node's state.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, NodeState> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Returns the number of nodes currently running.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.states
            .iter()
            .filter(|entry| entry.value().is_running())
            .count()
    }
}
