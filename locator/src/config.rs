use std::time::Duration;

/// Fixed-interval retry policy for locate calls.
///
/// This is the only retry loop in the engine; locate-based steps configure
/// it per call and nothing else retries on their behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Capture+match cycles to run before giving up. Contract: >= 1.
    pub max_attempts: u32,
    /// Sleep between consecutive attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Cooperative sleep between attempts; a zero interval yields nothing.
    pub(crate) async fn back_off(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Default for RetryPolicy {
    /// Ten attempts half a second apart.
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_millis(500),
        }
    }
}

/// Tunable parameters for one locate call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateOptions {
    /// Minimum normalized score in (0, 1] accepted as a hit.
    pub confidence: f64,
    pub retry: RetryPolicy,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            confidence: 0.72,
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LocateOptions;
    use std::time::Duration;

    #[test]
    fn defaults_match_the_shipped_tuning() {
        let options = LocateOptions::default();
        assert_eq!(options.confidence, 0.72);
        assert_eq!(options.retry.max_attempts, 10);
        assert_eq!(options.retry.interval, Duration::from_millis(500));
    }
}
