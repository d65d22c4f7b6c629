//! Pipeline-level supervision: registration, concurrent node execution,
//! and fatal-signal propagation.

use super::board::StatusBoard;
use super::node::NodeSupervisor;
use super::state::StopReason;
use crate::cancellation::ShutdownToken;
use crate::errors::FlowlineError;
use crate::events::{EventSink, NoOpEventSink};
use crate::node::{Node, WorkItem};
use crate::scope::StrategyScope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::error;

/// Runtime options for one supervised node.
#[derive(Debug, Clone)]
pub struct NodeOptions {
    /// Maximum items in flight concurrently on the node.
    pub concurrency: usize,
    /// Capacity of the node's bounded input queue; producers block when it
    /// is full, which is the backpressure seam for upstream collaborators.
    pub queue_capacity: usize,
    /// Optional destination for dead-lettered items.
    pub dead_letter: Option<mpsc::UnboundedSender<WorkItem>>,
}

impl Default for NodeOptions {
    /// Returns options with concurrency 4 and queue capacity 64.
    fn default() -> Self {
        Self {
            concurrency: 4,
            queue_capacity: 64,
            dead_letter: None,
        }
    }
}

impl NodeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the in-flight concurrency limit.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the input queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the dead-letter destination.
    #[must_use]
    pub fn with_dead_letter(mut self, sender: mpsc::UnboundedSender<WorkItem>) -> Self {
        self.dead_letter = Some(sender);
        self
    }
}

/// Handle for feeding items into a registered node.
///
/// Dropping every clone of the handle closes the node's input; the node
/// stops once all accepted items reach a terminal state.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    node_id: String,
    sender: mpsc::Sender<WorkItem>,
}

impl NodeHandle {
    /// Returns the target node id.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Submits an item, waiting while the node's input queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::NodeUnavailable`] if the node has stopped.
    pub async fn submit(&self, item: WorkItem) -> Result<(), FlowlineError> {
        self.sender
            .send(item)
            .await
            .map_err(|_| FlowlineError::NodeUnavailable {
                node_id: self.node_id.clone(),
            })
    }

    /// Submits an item without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::NodeSaturated`] when the queue is full and
    /// [`FlowlineError::NodeUnavailable`] if the node has stopped.
    pub fn try_submit(&self, item: WorkItem) -> Result<(), FlowlineError> {
        self.sender.try_send(item).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => FlowlineError::NodeSaturated {
                node_id: self.node_id.clone(),
            },
            mpsc::error::TrySendError::Closed(_) => FlowlineError::NodeUnavailable {
                node_id: self.node_id.clone(),
            },
        })
    }
}

/// Final accounting for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummary {
    /// The node id.
    pub node_id: String,
    /// Items that reached `Succeeded`.
    pub succeeded: u64,
    /// Items routed to the dead-letter path.
    pub dead_lettered: u64,
    /// Items still in flight when the node stopped.
    pub abandoned: u64,
    /// Lifetime restart count.
    pub total_restarts: u32,
    /// Why the node stopped.
    pub stop: StopReason,
}

/// Final accounting for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Per-node summaries, in completion order.
    pub nodes: Vec<NodeSummary>,
}

impl PipelineSummary {
    /// Returns the summary for one node.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&NodeSummary> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Returns the total number of succeeded items across nodes.
    #[must_use]
    pub fn total_succeeded(&self) -> u64 {
        self.nodes.iter().map(|n| n.succeeded).sum()
    }

    /// Returns the total number of dead-lettered items across nodes.
    #[must_use]
    pub fn total_dead_lettered(&self) -> u64 {
        self.nodes.iter().map(|n| n.dead_lettered).sum()
    }
}

/// Supervises a set of nodes as one pipeline.
///
/// Nodes are registered during assembly, each freezing the
/// [`StrategyScope`] configuration active at that moment. At run time every
/// node executes on its own task; the first fatal escalation cancels the
/// shared shutdown token, stopping every sibling node.
pub struct PipelineSupervisor {
    sink: Arc<dyn EventSink>,
    shutdown: ShutdownToken,
    status: Arc<StatusBoard>,
    nodes: Vec<NodeSupervisor>,
    registered: HashSet<String>,
}

impl Default for PipelineSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineSupervisor {
    /// Creates a supervisor with no event sink configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoOpEventSink),
            shutdown: ShutdownToken::new(),
            status: Arc::new(StatusBoard::new()),
            nodes: Vec::new(),
            registered: HashSet::new(),
        }
    }

    /// Sets the diagnostic event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns a clone of the pipeline-wide shutdown token.
    #[must_use]
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Returns the shared node status board.
    #[must_use]
    pub fn status(&self) -> Arc<StatusBoard> {
        Arc::clone(&self.status)
    }

    /// Registers a node, freezing the scope's active strategy and policy
    /// into the node's binding.
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::DuplicateNode`] if a node with the same id
    /// is already registered.
    pub fn register(
        &mut self,
        node: Arc<dyn Node>,
        scope: &StrategyScope,
        options: NodeOptions,
    ) -> Result<NodeHandle, FlowlineError> {
        let node_id = node.id().to_string();
        if !self.registered.insert(node_id.clone()) {
            return Err(FlowlineError::DuplicateNode { node_id });
        }

        let binding = scope.bind(&node_id);
        let (sender, receiver) = mpsc::channel(options.queue_capacity.max(1));
        self.nodes.push(NodeSupervisor::new(
            node,
            binding,
            options.concurrency,
            receiver,
            options.dead_letter,
            Arc::clone(&self.sink),
            self.shutdown.clone(),
            Arc::clone(&self.status),
        ));

        Ok(NodeHandle { node_id, sender })
    }

    /// Runs every registered node to completion.
    ///
    /// Returns once all nodes stop, whether by draining their input, by the
    /// shutdown signal, or because a node escalated. Shutdown alone is not
    /// an error; the first fatal escalation is.
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::Fatal`] with the first fatal fault, or
    /// [`FlowlineError::Internal`] if a node task aborted.
    pub async fn run(self) -> Result<PipelineSummary, FlowlineError> {
        let Self {
            nodes, shutdown, ..
        } = self;

        let mut tasks = JoinSet::new();
        for supervisor in nodes {
            tasks.spawn(supervisor.run());
        }

        let mut summary = PipelineSummary::default();
        let mut first_error: Option<FlowlineError> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(node_summary)) => summary.nodes.push(node_summary),
                Ok(Err(fatal)) => {
                    shutdown.cancel(fatal.to_string());
                    if first_error.is_none() {
                        first_error = Some(FlowlineError::Fatal(fatal));
                    }
                }
                Err(join_error) => {
                    error!(error = %join_error, "node task aborted");
                    shutdown.cancel("node task aborted");
                    if first_error.is_none() {
                        first_error = Some(FlowlineError::Internal(format!(
                            "node task aborted: {join_error}"
                        )));
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}
