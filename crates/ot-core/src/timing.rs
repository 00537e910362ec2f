//! Wall-clock budgets for runs.
//!
//! Every solver loop polls a [`Deadline`] so that a case that stops making progress
//! fails fast instead of hanging.

use std::time::{Duration, Instant};

use crate::OtError;

/// A simple timer that measures elapsed time.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in seconds.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Wall-clock limit attached to one run.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    watch: Stopwatch,
    limit: Option<Duration>,
}

impl Deadline {
    /// Start a deadline of `limit_s` seconds from now. Non-positive or non-finite
    /// limits disable the check.
    pub fn after_secs(limit_s: f64) -> Self {
        let limit = (limit_s.is_finite() && limit_s > 0.0).then(|| Duration::from_secs_f64(limit_s));
        Self {
            watch: Stopwatch::start(),
            limit,
        }
    }

    /// A deadline that never expires.
    pub fn unlimited() -> Self {
        Self {
            watch: Stopwatch::start(),
            limit: None,
        }
    }

    pub fn elapsed_s(&self) -> f64 {
        self.watch.elapsed_s()
    }

    /// Error once the limit has passed.
    pub fn check(&self) -> Result<(), OtError> {
        match self.limit {
            Some(limit) if self.watch.start.elapsed() > limit => Err(OtError::WallClock {
                limit_s: limit.as_secs_f64(),
                elapsed_s: self.elapsed_s(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_expires() {
        assert!(Deadline::unlimited().check().is_ok());
        assert!(Deadline::after_secs(0.0).check().is_ok());
    }

    #[test]
    fn tiny_limit_expires() {
        let d = Deadline::after_secs(1e-9);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(d.check(), Err(OtError::WallClock { .. })));
    }
}
