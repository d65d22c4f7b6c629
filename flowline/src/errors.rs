//! Error types for the flowline supervision runtime.
//!
//! The taxonomy separates failures by who may react to them: item-level
//! failures stay inside their node, node faults escalate through the restart
//! counters, and only [`FatalPipelineFault`] halts pipeline progress.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of an item-level failure.
///
/// Classification is the node implementation's responsibility; the
/// supervision runtime only reacts to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Retryable failure; consumes one unit of the item's retry budget.
    Transient,
    /// Never retried; the item is dead-lettered immediately.
    Permanent,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// A failure attributable to a single item flowing through a node.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{class} item failure: {message}")]
pub struct ItemFailure {
    /// Whether the failure is worth retrying.
    pub class: FailureClass,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ItemFailure {
    /// Creates a transient (retryable) item failure.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Transient,
            message: message.into(),
        }
    }

    /// Creates a permanent (never retried) item failure.
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Permanent,
            message: message.into(),
        }
    }

    /// Returns true if the failure is retryable.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.class == FailureClass::Transient
    }
}

/// A failure of a node's execution context, not attributable to any single
/// item. Recoverable via node restart, bounded by the restart limits.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("node fault: {message}")]
pub struct NodeFault {
    /// Human-readable description of the fault.
    pub message: String,
}

impl NodeFault {
    /// Creates a new node fault.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a node was escalated to a fatal stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalReason {
    /// The node consumed its lifetime restart budget.
    RestartLimitExceeded,
    /// The node restarted too many times without an intervening
    /// successful processing cycle.
    CrashLoopDetected,
    /// An upstream collaborator declared the pipeline fatal.
    UpstreamFatal,
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestartLimitExceeded => write!(f, "restart limit exceeded"),
            Self::CrashLoopDetected => write!(f, "crash loop detected"),
            Self::UpstreamFatal => write!(f, "upstream fatal"),
        }
    }
}

/// Terminal failure: the node is stopped and the pipeline-fatal signal
/// propagates. Raised only by restart-limit exhaustion or an explicit
/// upstream fatal signal.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("fatal pipeline fault on node '{node_id}' ({reason}): {message}")]
pub struct FatalPipelineFault {
    /// The node that escalated.
    pub node_id: String,
    /// Why the node escalated.
    pub reason: FatalReason,
    /// Description of the last underlying fault.
    pub message: String,
}

impl FatalPipelineFault {
    /// Creates a new fatal pipeline fault.
    #[must_use]
    pub fn new(
        node_id: impl Into<String>,
        reason: FatalReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            reason,
            message: message.into(),
        }
    }
}

/// Construction-time validation failure for a delay strategy.
///
/// Surfaced synchronously while the pipeline is being assembled, never at
/// run time.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("invalid delay strategy: {message}")]
pub struct InvalidStrategyConfig {
    /// What was wrong with the configuration.
    pub message: String,
}

impl InvalidStrategyConfig {
    /// Creates a new strategy validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Construction-time validation failure for a retry policy.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("invalid retry policy: {message}")]
pub struct InvalidPolicyConfig {
    /// What was wrong with the configuration.
    pub message: String,
}

impl InvalidPolicyConfig {
    /// Creates a new policy validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The main error type for flowline operations.
#[derive(Debug, Clone, Error)]
pub enum FlowlineError {
    /// A delay strategy failed validation.
    #[error("{0}")]
    Strategy(#[from] InvalidStrategyConfig),

    /// A retry policy failed validation.
    #[error("{0}")]
    Policy(#[from] InvalidPolicyConfig),

    /// A node escalated to a fatal stop.
    #[error("{0}")]
    Fatal(#[from] FatalPipelineFault),

    /// A node with the same id is already registered.
    #[error("node '{node_id}' is already registered")]
    DuplicateNode {
        /// The conflicting node id.
        node_id: String,
    },

    /// The node's input channel is closed (node stopped or shutting down).
    #[error("node '{node_id}' is not accepting items")]
    NodeUnavailable {
        /// The target node id.
        node_id: String,
    },

    /// The node's bounded input queue is full.
    #[error("node '{node_id}' input queue is full")]
    NodeSaturated {
        /// The target node id.
        node_id: String,
    },

    /// A generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
