//! Assembly-time strategy scope and per-node frozen bindings.
//!
//! [`StrategyScope`] is the configuration surface mutated while the pipeline
//! is being assembled. Each node captures a frozen [`NodeStrategyBinding`]
//! at registration time; mutating the scope afterwards never alters bindings
//! already handed out, so no implicit global state survives into run time.

use crate::backoff::{DelayStrategy, JitterStrategy};
use crate::policy::RetryPolicy;
use serde::{Deserialize, Serialize};

/// The currently active strategy, jitter, and policy of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// The active delay strategy.
    pub strategy: DelayStrategy,
    /// The active jitter strategy.
    pub jitter: JitterStrategy,
    /// The active retry policy.
    pub policy: RetryPolicy,
}

/// Mutable, assembly-time-only binding of the active retry configuration.
#[derive(Debug, Clone, Default)]
pub struct StrategyScope {
    strategy: DelayStrategy,
    jitter: JitterStrategy,
    policy: RetryPolicy,
}

impl StrategyScope {
    /// Creates a scope with the default strategy, jitter, and policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active delay strategy.
    ///
    /// Affects only nodes bound after this call.
    pub fn set_strategy(&mut self, strategy: DelayStrategy) {
        self.strategy = strategy;
    }

    /// Sets the active jitter strategy.
    pub fn set_jitter(&mut self, jitter: JitterStrategy) {
        self.jitter = jitter;
    }

    /// Sets the active retry policy.
    pub fn set_policy(&mut self, policy: RetryPolicy) {
        self.policy = policy;
    }

    /// Returns the currently active configuration without freezing it.
    #[must_use]
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            strategy: self.strategy,
            jitter: self.jitter,
            policy: self.policy,
        }
    }

    /// Freezes the active configuration into a binding for one node.
    #[must_use]
    pub fn bind(&self, node_id: impl Into<String>) -> NodeStrategyBinding {
        NodeStrategyBinding {
            node_id: node_id.into(),
            strategy: self.strategy,
            jitter: self.jitter,
            policy: self.policy,
        }
    }
}

/// Immutable per-node snapshot of the retry configuration, created exactly
/// once at node registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStrategyBinding {
    node_id: String,
    strategy: DelayStrategy,
    jitter: JitterStrategy,
    policy: RetryPolicy,
}

impl NodeStrategyBinding {
    /// Returns the bound node id.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Returns the frozen delay strategy.
    #[must_use]
    pub fn strategy(&self) -> &DelayStrategy {
        &self.strategy
    }

    /// Returns the frozen jitter strategy.
    #[must_use]
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Returns the frozen retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
