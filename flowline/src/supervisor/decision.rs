//! Pure transition decisions for the two state machines.
//!
//! Keeping these as plain functions over plain counters makes every counter
//! transition deterministically testable without spinning up a runtime.

use crate::backoff::DelayStrategy;
use crate::errors::{FailureClass, FatalReason};
use crate::policy::RetryPolicy;
use std::time::Duration;

/// What to do with a failed item.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ItemDecision {
    /// Re-execute the item after the delay; `attempt` is 1 for the first
    /// retry.
    Retry {
        /// The retry attempt number the delay was computed for.
        attempt: u32,
        /// Base delay before jitter.
        delay: Duration,
    },
    /// Route the item to the dead-letter path.
    DeadLetter {
        /// Total attempts the item consumed, including the original.
        attempts: u32,
    },
}

/// Decides the fate of an item whose latest attempt failed.
///
/// `attempts` counts every execution of the item so far, including the one
/// that just failed. An item is retried only while transient and within
/// budget: with `max_item_retries = 3` the fourth failure dead-letters.
pub(crate) fn decide_item(
    policy: &RetryPolicy,
    strategy: &DelayStrategy,
    class: FailureClass,
    attempts: u32,
) -> ItemDecision {
    if class == FailureClass::Transient && attempts <= policy.max_item_retries {
        ItemDecision::Retry {
            attempt: attempts,
            delay: strategy.compute(attempts),
        }
    } else {
        ItemDecision::DeadLetter { attempts }
    }
}

/// What to do with a faulted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartDecision {
    /// Re-initialize the node and resume dispatch.
    Restart,
    /// Stop the node permanently and propagate a pipeline-fatal signal.
    Escalate(FatalReason),
}

/// Decides whether a faulted node restarts or escalates.
///
/// `total` and `sequential` are the counter values after recording the
/// fault. The lifetime budget allows exactly `max_node_restart_attempts`
/// restarts; the fault after the last permitted restart escalates. The
/// sequential budget is a crash-loop detector over failed execution cycles:
/// reaching `max_sequential_node_attempts` consecutive faults with no
/// intervening success escalates even when the lifetime budget has headroom.
pub(crate) fn decide_restart(policy: &RetryPolicy, total: u32, sequential: u32) -> RestartDecision {
    if total > policy.max_node_restart_attempts {
        RestartDecision::Escalate(FatalReason::RestartLimitExceeded)
    } else if sequential >= policy.max_sequential_node_attempts {
        RestartDecision::Escalate(FatalReason::CrashLoopDetected)
    } else {
        RestartDecision::Restart
    }
}
