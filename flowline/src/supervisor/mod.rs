//! Supervision runtime.
//!
//! This module provides:
//! - [`PipelineSupervisor`]: registration and concurrent execution of nodes
//! - per-node item-retry and restart state machines
//! - [`StatusBoard`]: shared read-only view of node states

mod board;
mod decision;
mod node;
mod pipeline;
mod state;

pub use board::StatusBoard;
pub use pipeline::{NodeHandle, NodeOptions, NodeSummary, PipelineSummary, PipelineSupervisor};
pub use state::{ItemState, NodeState, StopReason};
