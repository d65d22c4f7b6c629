//! Jitter strategies for randomizing retry delays.
//!
//! Jitter is applied by the supervisor at the scheduling site, never inside
//! [`DelayStrategy::compute`](crate::backoff::DelayStrategy::compute), so the
//! base delay for each attempt is always derived deterministically from the
//! attempt number.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy for adding randomness to a computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterStrategy {
    /// No jitter; the computed delay is used as-is.
    #[default]
    None,
    /// Uniform random delay in `[0, d]`.
    Full,
    /// Half fixed, half random: uniform in `[d/2, d]`.
    Equal,
}

impl JitterStrategy {
    /// Applies jitter to a computed delay.
    #[must_use]
    pub fn apply(&self, delay: Duration) -> Duration {
        let millis = delay.as_millis() as u64;
        match self {
            Self::None => delay,
            Self::Full => {
                if millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
                }
            }
            Self::Equal => {
                let half = millis / 2;
                if half == 0 {
                    delay
                } else {
                    Duration::from_millis(half + rand::thread_rng().gen_range(0..=half))
                }
            }
        }
    }
}
