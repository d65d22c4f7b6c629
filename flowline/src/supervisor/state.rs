//! State machine enums for items and nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single item within its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Accepted, waiting for an execution slot.
    Pending,
    /// Currently being processed by the node.
    Executing,
    /// Waiting out a computed delay before re-execution.
    Retrying,
    /// Processed successfully. Terminal.
    Succeeded,
    /// Routed to the dead-letter path. Terminal.
    DeadLettered,
}

impl ItemState {
    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::DeadLettered)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Executing => write!(f, "executing"),
            Self::Retrying => write!(f, "retrying"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::DeadLettered => write!(f, "dead_lettered"),
        }
    }
}

/// Why a node stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Input closed and all accepted items reached a terminal state.
    Drained,
    /// A restart limit was exceeded.
    Fatal,
    /// The pipeline-wide shutdown signal fired.
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drained => write!(f, "drained"),
            Self::Fatal => write!(f, "fatal"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// State of a supervised node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Dispatching and processing items.
    Running,
    /// A node-level fault was observed; restart pending.
    Faulted,
    /// Re-initializing node-local execution state.
    Restarting,
    /// Permanently stopped. Terminal.
    Stopped(StopReason),
}

impl NodeState {
    /// Returns true if the node is dispatching items.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Faulted => write!(f, "faulted"),
            Self::Restarting => write!(f, "restarting"),
            Self::Stopped(reason) => write!(f, "stopped ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_terminal_states() {
        assert!(ItemState::Succeeded.is_terminal());
        assert!(ItemState::DeadLettered.is_terminal());
        assert!(!ItemState::Pending.is_terminal());
        assert!(!ItemState::Executing.is_terminal());
        assert!(!ItemState::Retrying.is_terminal());
    }

    #[test]
    fn test_node_terminal_states() {
        assert!(NodeState::Stopped(StopReason::Fatal).is_terminal());
        assert!(!NodeState::Running.is_terminal());
        assert!(!NodeState::Restarting.is_terminal());
        assert!(NodeState::Running.is_running());
        assert!(!NodeState::Faulted.is_running());
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeState::Running.to_string(), "running");
        assert_eq!(
            NodeState::Stopped(StopReason::Shutdown).to_string(),
            "stopped (shutdown)"
        );
        assert_eq!(ItemState::DeadLettered.to_string(), "dead_lettered");
    }
}
