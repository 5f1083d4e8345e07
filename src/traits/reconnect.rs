use std::time::Duration;

/// Trait for defining reconnection policies
///
/// Implement this trait to control how a connection manager behaves
/// after an unexpected close or a failed connection attempt.
pub trait ReconnectPolicy: Send + Sync + 'static {
    /// Get the delay before the given reconnection attempt
    ///
    /// # Arguments
    /// * `attempt` - The reconnection attempt number, starting at 1. The
    ///   manager increments its attempt counter before calling this.
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long before reconnecting
    /// * `None` - Budget exhausted, stop reconnecting
    fn next_delay(&self, attempt: usize) -> Option<Duration>;
}

/// Linear backoff reconnection policy
///
/// The delay grows linearly with the attempt number: `base * attempt`,
/// up to `max_attempts` attempts. The growth is deliberately linear, not
/// exponential; callers rely on the exact `base * n` schedule.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
    max_attempts: usize,
}

impl LinearBackoff {
    /// Create a new linear backoff policy
    ///
    /// # Arguments
    /// * `base` - Delay before the first retry; attempt `n` waits `base * n`
    /// * `max_attempts` - Number of retries before giving up
    pub fn new(base: Duration, max_attempts: usize) -> Self {
        Self { base, max_attempts }
    }
}

impl Default for LinearBackoff {
    /// One second base interval, five attempts
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 5)
    }
}

impl ReconnectPolicy for LinearBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(self.base * attempt as u32)
    }
}

/// Never reconnect policy
///
/// The connection is disabled after the first close. Useful for one-shot
/// connections and tests.
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectPolicy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }
}
