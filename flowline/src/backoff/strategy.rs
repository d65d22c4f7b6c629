//! Delay strategies for computing retry wait times.
//!
//! A [`DelayStrategy`] maps an attempt number to a wait duration. The first
//! retry is attempt 1; the original execution never consults the strategy.
//! The enum is closed on purpose: every delay shape is handled exhaustively
//! at the single [`DelayStrategy::compute`] call site.

use crate::errors::InvalidStrategyConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy for computing the delay before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayStrategy {
    /// Constant delay for every attempt.
    Fixed {
        /// The delay returned for every attempt.
        delay: Duration,
    },
    /// Delay grows by a fixed increment per attempt, capped at `max`.
    Linear {
        /// Delay for the first retry.
        base: Duration,
        /// Added per subsequent attempt.
        increment: Duration,
        /// Upper bound on the computed delay.
        max: Duration,
    },
    /// Delay grows geometrically per attempt, capped at `max`.
    Exponential {
        /// Delay for the first retry.
        base: Duration,
        /// Multiplicative growth factor, strictly greater than 1.
        multiplier: f64,
        /// Upper bound on the computed delay.
        max: Duration,
    },
}

impl Default for DelayStrategy {
    /// Returns a fixed one-second delay.
    fn default() -> Self {
        Self::Fixed {
            delay: Duration::from_secs(1),
        }
    }
}

impl DelayStrategy {
    /// Creates a fixed-delay strategy.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// Creates a linear backoff strategy.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStrategyConfig`] if `max < base`.
    pub fn linear(
        base: Duration,
        increment: Duration,
        max: Duration,
    ) -> Result<Self, InvalidStrategyConfig> {
        if max < base {
            return Err(InvalidStrategyConfig::new(format!(
                "max ({max:?}) must be at least base ({base:?})"
            )));
        }
        Ok(Self::Linear {
            base,
            increment,
            max,
        })
    }

    /// Creates an exponential backoff strategy.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStrategyConfig`] if `multiplier` is not finite or
    /// not strictly greater than 1, or if `max < base`.
    pub fn exponential(
        base: Duration,
        multiplier: f64,
        max: Duration,
    ) -> Result<Self, InvalidStrategyConfig> {
        if !multiplier.is_finite() || multiplier <= 1.0 {
            return Err(InvalidStrategyConfig::new(format!(
                "multiplier ({multiplier}) must be finite and greater than 1"
            )));
        }
        if max < base {
            return Err(InvalidStrategyConfig::new(format!(
                "max ({max:?}) must be at least base ({base:?})"
            )));
        }
        Ok(Self::Exponential {
            base,
            multiplier,
            max,
        })
    }

    /// Computes the delay for the given attempt number (1-indexed).
    ///
    /// Attempt numbers below 1 are treated as 1. Capped variants saturate:
    /// a product that would overflow the numeric range collapses to `max`,
    /// never to an overflowed or negative value.
    #[must_use]
    pub fn compute(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Self::Fixed { delay } => *delay,
            Self::Linear {
                base,
                increment,
                max,
            } => {
                let grown = base.saturating_add(increment.saturating_mul(attempt - 1));
                grown.min(*max)
            }
            Self::Exponential {
                base,
                multiplier,
                max,
            } => {
                let exponent = (attempt - 1).min(i32::MAX as u32) as i32;
                let secs = base.as_secs_f64() * multiplier.powi(exponent);
                let max_secs = max.as_secs_f64();
                if !secs.is_finite() || secs < 0.0 || secs > max_secs {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_is_constant() {
        let strategy = DelayStrategy::fixed(Duration::from_secs(2));
        assert_eq!(strategy.compute(1), Duration::from_secs(2));
        assert_eq!(strategy.compute(5), Duration::from_secs(2));
    }

    #[test]
    fn test_linear_growth_and_cap() {
        let strategy = DelayStrategy::linear(
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(strategy.compute(1), Duration::from_millis(100));
        assert_eq!(strategy.compute(3), Duration::from_millis(500));
        assert_eq!(strategy.compute(30), Duration::from_secs(5));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let strategy = DelayStrategy::exponential(
            Duration::from_secs(1),
            2.0,
            Duration::from_secs(60),
        )
        .unwrap();

        assert_eq!(strategy.compute(1), Duration::from_secs(1));
        assert_eq!(strategy.compute(6), Duration::from_secs(32));
        // Unsaturated value would be 64s, capped at 60s.
        assert_eq!(strategy.compute(7), Duration::from_secs(60));
    }

    #[test]
    fn test_exponential_overflow_saturates_to_max() {
        let strategy = DelayStrategy::exponential(
            Duration::from_secs(1),
            10.0,
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(strategy.compute(u32::MAX), Duration::from_secs(30));
        assert_eq!(strategy.compute(400), Duration::from_secs(30));
    }

    #[test]
    fn test_linear_overflow_saturates_to_max() {
        let strategy = DelayStrategy::linear(
            Duration::from_secs(1),
            Duration::from_secs(u64::MAX / 2),
            Duration::from_secs(120),
        )
        .unwrap();

        assert_eq!(strategy.compute(u32::MAX), Duration::from_secs(120));
    }

    #[test]
    fn test_attempt_zero_treated_as_one() {
        let strategy = DelayStrategy::linear(
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(strategy.compute(0), strategy.compute(1));
    }

    #[test]
    fn test_exponential_rejects_bad_multiplier() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        assert!(DelayStrategy::exponential(base, 1.0, max).is_err());
        assert!(DelayStrategy::exponential(base, 0.5, max).is_err());
        assert!(DelayStrategy::exponential(base, f64::NAN, max).is_err());
        assert!(DelayStrategy::exponential(base, f64::INFINITY, max).is_err());
        assert!(DelayStrategy::exponential(base, 1.5, max).is_ok());
    }

    #[test]
    fn test_max_below_base_rejected() {
        let base = Duration::from_secs(10);
        let max = Duration::from_secs(5);

        assert!(DelayStrategy::linear(base, Duration::ZERO, max).is_err());
        assert!(DelayStrategy::exponential(base, 2.0, max).is_err());
    }

    #[test]
    fn test_result_never_exceeds_max() {
        let strategy = DelayStrategy::exponential(
            Duration::from_millis(250),
            3.0,
            Duration::from_secs(45),
        )
        .unwrap();

        for attempt in 1..200 {
            assert!(strategy.compute(attempt) <= Duration::from_secs(45));
        }
    }

    #[test]
    fn test_serialization_round_trip() {
        let strategy = DelayStrategy::exponential(
            Duration::from_secs(1),
            2.0,
            Duration::from_secs(60),
        )
        .unwrap();
        let json = serde_json::to_string(&strategy).unwrap();
        let back: DelayStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(strategy, back);
    }
}
