//! Delay computation for retries.
//!
//! This module provides:
//! - [`DelayStrategy`]: closed set of delay shapes (fixed, linear, exponential)
//! - [`JitterStrategy`]: optional randomization applied at the scheduling site

mod jitter;
mod strategy;

pub use jitter::JitterStrategy;
pub use strategy::DelayStrategy;
