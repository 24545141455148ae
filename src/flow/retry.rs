use rand::Rng;
use std::time::Duration;

/// Backoff policy for transport-level failures.
///
/// Off by default: the executor surfaces transport errors to the caller and
/// keeps the current stage submittable. Attach a policy explicitly to retry
/// instead. Delays grow exponentially up to `max_delay` and are jittered so
/// synchronized clients do not stampede.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before the given retry attempt, counted from zero
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponential =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = exponential.min(self.max_delay.as_millis() as f64);

        let jittered = if self.jitter > 0.0 {
            let mut rng = rand::thread_rng();
            capped * rng.gen_range(1.0 - self.jitter..1.0)
        } else {
            capped
        };

        Duration::from_millis(jittered as u64)
    }
}
