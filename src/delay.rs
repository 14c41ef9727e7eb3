//! Delay policy
//!
//! Decides how long a request is held before the response is written.
//! A policy is built once at startup; the uniform variant draws a fresh
//! value for every request.

use std::fmt;
use std::time::Duration;

use rand::Rng;

use crate::config::{DelayConfig, DelayMode};
use crate::error::ServerError;

/// How long to pause before answering a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Same duration for every request
    Fixed(Duration),
    /// Continuous uniform over `[min, max)`, sampled per request
    Uniform { min: Duration, max: Duration },
}

impl DelayPolicy {
    /// Build a validated policy from the `[delay]` configuration section
    pub fn from_config(config: &DelayConfig) -> Result<Self, ServerError> {
        match config.mode {
            DelayMode::Fixed => Ok(Self::Fixed(Duration::from_millis(config.fixed_ms))),
            DelayMode::Uniform => Self::uniform(
                Duration::from_millis(config.min_ms),
                Duration::from_millis(config.max_ms),
            ),
        }
    }

    pub fn uniform(min: Duration, max: Duration) -> Result<Self, ServerError> {
        if min > max {
            return Err(ServerError::InvalidDelay(format!(
                "uniform lower bound {}ms exceeds upper bound {}ms",
                min.as_millis(),
                max.as_millis()
            )));
        }
        Ok(Self::Uniform { min, max })
    }

    /// Longest delay this policy can produce
    pub const fn max_delay(&self) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Uniform { max, .. } => max,
        }
    }

    /// Sample a delay using the thread-local generator
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::rng())
    }

    /// Sample a delay using the given generator
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            // an empty range would panic inside rand
            Self::Uniform { min, max } if min == max => min,
            Self::Uniform { min, max } => {
                let secs = rng.random_range(min.as_secs_f64()..max.as_secs_f64());
                // float rounding can land exactly on the open upper bound
                Duration::from_secs_f64(secs).clamp(min, max.saturating_sub(Duration::from_nanos(1)))
            }
        }
    }
}

impl fmt::Display for DelayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(delay) => write!(f, "fixed {}ms", delay.as_millis()),
            Self::Uniform { min, max } => {
                write!(f, "uniform [{}ms, {}ms)", min.as_millis(), max.as_millis())
            }
        }
    }
}
