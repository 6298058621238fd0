//! Progress throttling.
//!
//! Byte-level progress inside one entry can fire once per network read.
//! The throttle keeps those updates to at most one per interval.

use std::time::{Duration, Instant};

/// Rate-limiter for in-entry progress updates.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a new throttle with the specified minimum interval.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Create a throttle with a default interval of 100ms.
    pub const fn default_interval() -> Self {
        Self::new(Duration::from_millis(100))
    }

    /// Check if enough time has passed to emit another progress update.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Start a quiet window now.
    ///
    /// Called when an entry starts, so an entry that finishes within one
    /// interval only produces its completion update.
    pub fn arm(&mut self) {
        self.last_emit = Some(Instant::now());
    }

    /// Force the next check to return true.
    pub const fn reset(&mut self) {
        self.last_emit = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::default_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_first_emit() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.should_emit());
    }

    #[test]
    fn test_throttle_respects_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(50));
        assert!(throttle.should_emit());
        assert!(!throttle.should_emit());

        std::thread::sleep(Duration::from_millis(60));
        assert!(throttle.should_emit());
    }

    #[test]
    fn test_armed_throttle_waits_a_full_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        throttle.arm();
        assert!(!throttle.should_emit());

        throttle.reset();
        assert!(throttle.should_emit());
    }
}
