//! Per-node supervision: the item-retry and node-restart state machines.

use super::board::StatusBoard;
use super::decision::{decide_item, decide_restart, ItemDecision, RestartDecision};
use super::pipeline::NodeSummary;
use super::state::{ItemState, NodeState, StopReason};
use crate::cancellation::ShutdownToken;
use crate::errors::{FatalPipelineFault, FatalReason, NodeFault};
use crate::events::{EventSink, SupervisorEvent};
use crate::node::{ItemOutcome, Node, WorkItem};
use crate::scope::NodeStrategyBinding;
use crate::tracker::AttemptTracker;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Completion of one in-flight future: either an execution finished or a
/// retry timer elapsed.
enum Flight {
    Finished(WorkItem, Result<ItemOutcome, NodeFault>),
    Ready(WorkItem),
}

/// Drives one node's execution, retry scheduling, and restart escalation.
///
/// All counters are private to this supervisor and mutated only by the task
/// running [`NodeSupervisor::run`]; nothing is shared across nodes.
pub(crate) struct NodeSupervisor {
    node: Arc<dyn Node>,
    binding: NodeStrategyBinding,
    tracker: AttemptTracker,
    concurrency: usize,
    input: mpsc::Receiver<WorkItem>,
    dead_letter: Option<mpsc::UnboundedSender<WorkItem>>,
    sink: Arc<dyn EventSink>,
    shutdown: ShutdownToken,
    status: Arc<StatusBoard>,
    state: NodeState,
    item_states: HashMap<String, ItemState>,
    succeeded: u64,
    dead_lettered: u64,
}

impl NodeSupervisor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        node: Arc<dyn Node>,
        binding: NodeStrategyBinding,
        concurrency: usize,
        input: mpsc::Receiver<WorkItem>,
        dead_letter: Option<mpsc::UnboundedSender<WorkItem>>,
        sink: Arc<dyn EventSink>,
        shutdown: ShutdownToken,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            node,
            binding,
            tracker: AttemptTracker::new(),
            concurrency: concurrency.max(1),
            input,
            dead_letter,
            sink,
            shutdown,
            status,
            state: NodeState::Running,
            item_states: HashMap::new(),
            succeeded: 0,
            dead_lettered: 0,
        }
    }

    fn execute(node: Arc<dyn Node>, item: WorkItem) -> BoxFuture<'static, Flight> {
        Box::pin(async move {
            let result = node.process(&item).await;
            Flight::Finished(item, result)
        })
    }

    fn requeue_after(item: WorkItem, delay: Duration) -> BoxFuture<'static, Flight> {
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Flight::Ready(item)
        })
    }

    fn set_state(&mut self, state: NodeState) {
        debug!(
            node_id = %self.binding.node_id(),
            from = %self.state,
            to = %state,
            "node state transition"
        );
        self.state = state;
        self.status.set(self.binding.node_id(), state);
    }

    fn summary(&self, stop: StopReason) -> NodeSummary {
        NodeSummary {
            node_id: self.binding.node_id().to_string(),
            succeeded: self.succeeded,
            dead_lettered: self.dead_lettered,
            abandoned: self.item_states.len() as u64,
            total_restarts: self.tracker.total_restarts(),
            stop,
        }
    }

    /// Runs the node to completion: until its input drains, the pipeline
    /// shuts down, or a restart limit converts a fault into a fatal stop.
    pub(crate) async fn run(mut self) -> Result<NodeSummary, FatalPipelineFault> {
        self.set_state(NodeState::Running);
        self.sink
            .try_emit(SupervisorEvent::node_started(self.binding.node_id()));

        let mut in_flight: FuturesUnordered<BoxFuture<'static, Flight>> = FuturesUnordered::new();
        let mut ready: VecDeque<WorkItem> = VecDeque::new();
        let mut executing: usize = 0;
        let mut input_open = true;

        let fatal = loop {
            // Dispatch waiting items up to the concurrency limit. Paused
            // while the node is not running, so a restart halts dispatch on
            // this node only.
            while self.state.is_running() && executing < self.concurrency {
                let Some(item) = ready.pop_front() else { break };
                self.item_states
                    .insert(item.id().to_string(), ItemState::Executing);
                in_flight.push(Self::execute(Arc::clone(&self.node), item));
                executing += 1;
            }

            if !input_open && in_flight.is_empty() && ready.is_empty() {
                break None;
            }

            let accept_input =
                input_open && self.state.is_running() && executing < self.concurrency;

            tokio::select! {
                () = self.shutdown.cancelled() => {
                    // Dropping `in_flight` cancels every outstanding retry
                    // timer; executing attempts are abandoned.
                    self.set_state(NodeState::Stopped(StopReason::Shutdown));
                    self.sink.try_emit(SupervisorEvent::node_stopped(
                        self.binding.node_id(),
                        "shutdown",
                    ));
                    return Ok(self.summary(StopReason::Shutdown));
                }
                received = self.input.recv(), if accept_input => {
                    match received {
                        Some(item) => {
                            self.item_states
                                .insert(item.id().to_string(), ItemState::Pending);
                            ready.push_back(item);
                        }
                        None => input_open = false,
                    }
                }
                // An empty set yields `None`, which disables this branch
                // for the rest of the select call.
                Some(flight) = in_flight.next() => {
                    match flight {
                        Flight::Finished(item, Ok(outcome)) => {
                            executing -= 1;
                            self.on_item_outcome(item, &outcome, &mut in_flight);
                        }
                        Flight::Finished(item, Err(fault)) => {
                            executing -= 1;
                            // The fault is not attributable to the item:
                            // requeue it without charging its retry budget.
                            self.item_states
                                .insert(item.id().to_string(), ItemState::Pending);
                            ready.push_front(item);
                            if let Some(fatal) = self.on_node_fault(&fault).await {
                                break Some(fatal);
                            }
                        }
                        Flight::Ready(item) => {
                            self.item_states
                                .insert(item.id().to_string(), ItemState::Pending);
                            ready.push_back(item);
                        }
                    }
                }
            }
        };

        if let Some(fatal) = fatal {
            self.set_state(NodeState::Stopped(StopReason::Fatal));
            return Err(fatal);
        }

        self.set_state(NodeState::Stopped(StopReason::Drained));
        self.sink
            .try_emit(SupervisorEvent::node_stopped(self.binding.node_id(), "drained"));
        Ok(self.summary(StopReason::Drained))
    }

    /// Applies the item state machine to a finished attempt.
    fn on_item_outcome(
        &mut self,
        item: WorkItem,
        outcome: &ItemOutcome,
        in_flight: &mut FuturesUnordered<BoxFuture<'static, Flight>>,
    ) {
        match outcome {
            ItemOutcome::Success => {
                debug!(
                    node_id = %self.binding.node_id(),
                    item_id = %item.id(),
                    "item succeeded"
                );
                self.item_states.remove(item.id());
                self.tracker.clear_item(item.id());
                // A successful item proves the node is healthy.
                self.tracker.mark_cycle_success();
                self.succeeded += 1;
            }
            ItemOutcome::Failure(failure) => {
                let attempts = self.tracker.record_item_failure(item.id());
                let decision = decide_item(
                    self.binding.policy(),
                    self.binding.strategy(),
                    failure.class,
                    attempts,
                );
                match decision {
                    ItemDecision::Retry { attempt, delay } => {
                        let delay = self.binding.jitter().apply(delay);
                        self.sink.try_emit(SupervisorEvent::retry_scheduled(
                            self.binding.node_id(),
                            item.id(),
                            attempt,
                            delay,
                        ));
                        debug!(
                            node_id = %self.binding.node_id(),
                            item_id = %item.id(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %failure,
                            "retry scheduled"
                        );
                        self.item_states
                            .insert(item.id().to_string(), ItemState::Retrying);
                        in_flight.push(Self::requeue_after(item, delay));
                    }
                    ItemDecision::DeadLetter { attempts } => {
                        self.sink.try_emit(SupervisorEvent::item_exhausted(
                            self.binding.node_id(),
                            item.id(),
                            attempts,
                        ));
                        warn!(
                            node_id = %self.binding.node_id(),
                            item_id = %item.id(),
                            attempts,
                            error = %failure,
                            "item dead-lettered"
                        );
                        self.item_states.remove(item.id());
                        self.tracker.clear_item(item.id());
                        self.dead_lettered += 1;
                        if let Some(queue) = &self.dead_letter {
                            let _ = queue.send(item);
                        }
                    }
                }
            }
        }
    }

    /// Applies the node state machine to a fault: restart or escalate.
    ///
    /// Returns the fatal fault when a restart limit was exceeded.
    async fn on_node_fault(&mut self, fault: &NodeFault) -> Option<FatalPipelineFault> {
        if self.shutdown.is_cancelled() {
            // No restart transitions once shutdown is in progress.
            return None;
        }

        self.set_state(NodeState::Faulted);
        warn!(
            node_id = %self.binding.node_id(),
            error = %fault,
            "node fault"
        );

        let (total, sequential) = self.tracker.record_restart();
        match decide_restart(self.binding.policy(), total, sequential) {
            RestartDecision::Escalate(reason) => Some(self.escalate(reason, &fault.message)),
            RestartDecision::Restart => {
                self.set_state(NodeState::Restarting);
                loop {
                    let delay = self
                        .binding
                        .jitter()
                        .apply(self.binding.strategy().compute(self.tracker.sequential_restarts()));
                    if !delay.is_zero() {
                        tokio::select! {
                            () = tokio::time::sleep(delay) => {}
                            () = self.shutdown.cancelled() => return None,
                        }
                    }

                    match self.node.reset().await {
                        Ok(()) => break,
                        Err(reset_fault) => {
                            warn!(
                                node_id = %self.binding.node_id(),
                                error = %reset_fault,
                                "node re-initialization failed"
                            );
                            let (total, sequential) = self.tracker.record_restart();
                            if let RestartDecision::Escalate(reason) =
                                decide_restart(self.binding.policy(), total, sequential)
                            {
                                return Some(self.escalate(reason, &reset_fault.message));
                            }
                        }
                    }

                    if self.shutdown.is_cancelled() {
                        return None;
                    }
                }

                if self.shutdown.is_cancelled() {
                    return None;
                }
                self.set_state(NodeState::Running);
                self.sink.try_emit(SupervisorEvent::node_restarted(
                    self.binding.node_id(),
                    self.tracker.total_restarts(),
                    self.tracker.sequential_restarts(),
                ));
                debug!(
                    node_id = %self.binding.node_id(),
                    total_restarts = self.tracker.total_restarts(),
                    sequential_restarts = self.tracker.sequential_restarts(),
                    "node restarted"
                );
                None
            }
        }
    }

    fn escalate(&mut self, reason: FatalReason, message: &str) -> FatalPipelineFault {
        let fatal = FatalPipelineFault::new(self.binding.node_id(), reason, message);
        // Reported before the Stopped transition completes.
        self.sink.try_emit(SupervisorEvent::node_fatal(&fatal));
        error!(
            node_id = %self.binding.node_id(),
            reason = %reason,
            total_restarts = self.tracker.total_restarts(),
            sequential_restarts = self.tracker.sequential_restarts(),
            "node escalated to fatal"
        );
        fatal
    }
}
