//! # Flowline
//!
//! Resilient retry and supervision runtime for data pipeline nodes.
//!
//! Flowline wraps the execution of pipeline nodes (sources, transforms,
//! sinks) and decides, for every failed unit of work, whether and when to
//! retry, how many times a malfunctioning node may be restarted, and when
//! repeated failure must escalate to a fatal, pipeline-stopping condition.
//! It provides:
//!
//! - **Delay strategies**: fixed, linear, and exponential backoff with
//!   saturation and optional jitter
//! - **Frozen per-node bindings**: each node snapshots the active strategy
//!   and policy at registration time
//! - **Two-level escalation**: independent item-retry and node-restart
//!   state machines with distinct counter semantics
//! - **Event-driven observability**: fire-and-forget diagnostic events
//! - **Structured shutdown**: an idempotent signal that cancels retry
//!   timers and prevents further restarts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowline::prelude::*;
//!
//! // Configure the assembly-time scope
//! let mut scope = StrategyScope::new();
//! scope.set_strategy(DelayStrategy::exponential(
//!     Duration::from_millis(100), 2.0, Duration::from_secs(30),
//! )?);
//! scope.set_policy(RetryPolicy::default());
//!
//! // Register nodes; each freezes the scope's current configuration
//! let mut pipeline = PipelineSupervisor::new();
//! let handle = pipeline.register(my_node, &scope, NodeOptions::new())?;
//!
//! // Feed items and run
//! handle.submit(WorkItem::new(payload)).await?;
//! drop(handle);
//! let summary = pipeline.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod backoff;
pub mod cancellation;
pub mod errors;
pub mod events;
pub mod node;
pub mod policy;
pub mod scope;
pub mod supervisor;
pub mod tracker;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{DelayStrategy, JitterStrategy};
    pub use crate::cancellation::ShutdownToken;
    pub use crate::errors::{
        FailureClass, FatalPipelineFault, FatalReason, FlowlineError, InvalidPolicyConfig,
        InvalidStrategyConfig, ItemFailure, NodeFault,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, SupervisorEvent,
    };
    pub use crate::node::{FnNode, ItemOutcome, Node, WorkItem};
    pub use crate::policy::RetryPolicy;
    pub use crate::scope::{NodeStrategyBinding, ScopeSnapshot, StrategyScope};
    pub use crate::supervisor::{
        ItemState, NodeHandle, NodeOptions, NodeState, NodeSummary, PipelineSummary,
        PipelineSupervisor, StatusBoard, StopReason,
    };
    pub use crate::tracker::AttemptTracker;
}
