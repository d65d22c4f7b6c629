//! Node trait and work item types.
//!
//! Nodes are the external collaborators supervised by this crate: sources,
//! transforms, and sinks of the pipeline graph. The supervisor only sees
//! their classified outcomes.

use crate::errors::{ItemFailure, NodeFault};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

/// A single unit of data flowing through a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    id: String,
    payload: serde_json::Value,
}

impl WorkItem {
    /// Creates a work item with a generated id.
    #[must_use]
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
        }
    }

    /// Creates a work item with an explicit id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Returns the item id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the item payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

/// Classified outcome of processing one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// The item was processed successfully.
    Success,
    /// The item failed, with a classification decided by the node.
    Failure(ItemFailure),
}

impl ItemOutcome {
    /// Creates a success outcome.
    #[must_use]
    pub fn success() -> Self {
        Self::Success
    }

    /// Creates a transient (retryable) failure outcome.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Failure(ItemFailure::transient(message))
    }

    /// Creates a permanent (never retried) failure outcome.
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Failure(ItemFailure::permanent(message))
    }

    /// Returns true if the outcome is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Trait for pipeline nodes supervised by this crate.
///
/// `process` reports item-level results through its `Ok` value; an `Err`
/// is a node-level fault not attributable to the item, handled through the
/// restart state machine. `reset` re-initializes node-local execution state
/// during a restart; item retry budgets survive it.
#[async_trait]
pub trait Node: Send + Sync + Debug {
    /// Returns the node id, unique within the pipeline.
    fn id(&self) -> &str;

    /// Processes one item.
    ///
    /// # Errors
    ///
    /// Returns [`NodeFault`] when the node's execution context itself
    /// failed, independent of the item.
    async fn process(&self, item: &WorkItem) -> Result<ItemOutcome, NodeFault>;

    /// Re-initializes node-local execution state after a fault.
    ///
    /// # Errors
    ///
    /// Returns [`NodeFault`] if re-initialization failed; the supervisor
    /// charges it against the restart budget like any other fault.
    async fn reset(&self) -> Result<(), NodeFault> {
        Ok(())
    }
}

/// A simple function-based node, mainly for tests and small transforms.
pub struct FnNode<F>
where
    F: Fn(&WorkItem) -> Result<ItemOutcome, NodeFault> + Send + Sync,
{
    id: String,
    func: F,
}

impl<F> FnNode<F>
where
    F: Fn(&WorkItem) -> Result<ItemOutcome, NodeFault> + Send + Sync,
{
    /// Creates a new function-based node.
    pub fn new(id: impl Into<String>, func: F) -> Self {
        Self {
            id: id.into(),
            func,
        }
    }
}

impl<F> Debug for FnNode<F>
where
    F: Fn(&WorkItem) -> Result<ItemOutcome, NodeFault> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnNode").field("id", &self.id).finish()
    }
}

#[async_trait]
impl<F> Node for FnNode<F>
where
    F: Fn(&WorkItem) -> Result<ItemOutcome, NodeFault> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn process(&self, item: &WorkItem) -> Result<ItemOutcome, NodeFault> {
        (self.func)(item)
    }
}
