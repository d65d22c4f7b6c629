//! Retry policy: the three limits governing item retries and node restarts.

use crate::errors::InvalidPolicyConfig;
use serde::{Deserialize, Serialize};

/// Limits governing item retries, node restarts, and crash-loop escalation.
///
/// A policy is immutable once bound to a node via
/// [`StrategyScope::bind`](crate::scope::StrategyScope::bind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Additional attempts an item may consume after its original execution
    /// before being routed to the dead-letter path.
    pub max_item_retries: u32,
    /// Restarts a node's execution context may consume across its entire
    /// lifetime.
    pub max_node_restart_attempts: u32,
    /// Consecutive failed execution cycles, with no intervening successful
    /// processing, before the node is declared crash-looping. A distinct
    /// escalation path from the lifetime total: it trips even when the
    /// lifetime budget still has headroom.
    pub max_sequential_node_attempts: u32,
}

impl Default for RetryPolicy {
    /// Returns a policy with 3 item retries, 10 lifetime restarts, and
    /// 5 sequential attempts.
    fn default() -> Self {
        Self {
            max_item_retries: 3,
            max_node_restart_attempts: 10,
            max_sequential_node_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    #[must_use]
    pub fn new(
        max_item_retries: u32,
        max_node_restart_attempts: u32,
        max_sequential_node_attempts: u32,
    ) -> Self {
        Self {
            max_item_retries,
            max_node_restart_attempts,
            max_sequential_node_attempts,
        }
    }

    /// Builds a policy from raw, possibly negative integers.
    ///
    /// This is the validating boundary for limits sourced from external
    /// configuration; [`RetryPolicy::new`] already guarantees non-negativity
    /// through its unsigned parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPolicyConfig`] if any value is negative or exceeds
    /// `u32::MAX`.
    pub fn from_values(
        max_item_retries: i64,
        max_node_restart_attempts: i64,
        max_sequential_node_attempts: i64,
    ) -> Result<Self, InvalidPolicyConfig> {
        let check = |name: &str, value: i64| -> Result<u32, InvalidPolicyConfig> {
            u32::try_from(value).map_err(|_| {
                InvalidPolicyConfig::new(format!(
                    "{name} must be between 0 and {}, got {value}",
                    u32::MAX
                ))
            })
        };
        Ok(Self {
            max_item_retries: check("max_item_retries", max_item_retries)?,
            max_node_restart_attempts: check(
                "max_node_restart_attempts",
                max_node_restart_attempts,
            )?,
            max_sequential_node_attempts: check(
                "max_sequential_node_attempts",
                max_sequential_node_attempts,
            )?,
        })
    }

    /// Sets the item retry budget.
    #[must_use]
    pub fn with_max_item_retries(mut self, retries: u32) -> Self {
        self.max_item_retries = retries;
        self
    }

    /// Sets the lifetime restart budget.
    #[must_use]
    pub fn with_max_node_restart_attempts(mut self, attempts: u32) -> Self {
        self.max_node_restart_attempts = attempts;
        self
    }

    /// Sets the crash-loop budget.
    #[must_use]
    pub fn with_max_sequential_node_attempts(mut self, attempts: u32) -> Self {
        self.max_sequential_node_attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_item_retries, 3);
        assert_eq!(policy.max_node_restart_attempts, 10);
        assert_eq!(policy.max_sequential_node_attempts, 5);
    }

    #[test]
    fn test_builder_methods() {
        let policy = RetryPolicy::default()
            .with_max_item_retries(7)
            .with_max_node_restart_attempts(2)
            .with_max_sequential_node_attempts(1);

        assert_eq!(policy.max_item_retries, 7);
        assert_eq!(policy.max_node_restart_attempts, 2);
        assert_eq!(policy.max_sequential_node_attempts, 1);
    }

    #[test]
    fn test_from_values_accepts_non_negative() {
        let policy = RetryPolicy::from_values(0, 10, 5).unwrap();
        assert_eq!(policy.max_item_retries, 0);
        assert_eq!(policy.max_node_restart_attempts, 10);
    }

    #[test]
    fn test_from_values_rejects_negative() {
        let err = RetryPolicy::from_values(-1, 10, 5).unwrap_err();
        assert!(err.message.contains("max_item_retries"));

        assert!(RetryPolicy::from_values(3, -2, 5).is_err());
        assert!(RetryPolicy::from_values(3, 10, -5).is_err());
    }

    #[test]
    fn test_from_values_rejects_overflow() {
        assert!(RetryPolicy::from_values(i64::from(u32::MAX) + 1, 0, 0).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let policy = RetryPolicy::new(1, 2, 3);
        let json = serde_json::to_string(&policy).unwrap();
        let back: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(policy, back);
    }
}
