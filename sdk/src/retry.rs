use std::fmt::{Display, Formatter};
use std::time::Duration;

const CONNECTION_MAX_ATTEMPTS: u32 = 5;
const CONNECTION_INITIAL_DELAY: Duration = Duration::from_secs(2);
const CONNECTION_BACKOFF_MULTIPLIER: u32 = 2;

const PUBLISH_MAX_ATTEMPTS: u32 = 3;
const PUBLISH_DELAY: Duration = Duration::from_secs(2);

/// Bounded retry schedule.
///
/// The delay slept after failed attempt `n` (1-based) is
/// `initial_delay * backoff_multiplier^(n - 1)`, capped by `max_delay` when it is set.
/// A multiplier of 1 gives a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: u32,
    max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            backoff_multiplier: backoff_multiplier.max(1),
            max_delay: None,
        }
    }

    /// Policy for establishing the broker connection: 5 attempts, 2s doubling.
    pub fn connection() -> Self {
        Self::new(
            CONNECTION_MAX_ATTEMPTS,
            CONNECTION_INITIAL_DELAY,
            CONNECTION_BACKOFF_MULTIPLIER,
        )
    }

    /// Policy for a single relay publish: 3 attempts, fixed 2s.
    pub fn publish() -> Self {
        Self::new(PUBLISH_MAX_ATTEMPTS, PUBLISH_DELAY, 1)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = if max_delay.is_zero() {
            None
        } else {
            Some(max_delay)
        };
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> u32 {
        self.backoff_multiplier
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Delay to sleep after the given failed attempt, before the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_multiplier.saturating_pow(exponent);
        let delay = self.initial_delay.saturating_mul(factor);
        match self.max_delay {
            Some(max_delay) => delay.min(max_delay),
            None => delay,
        }
    }

    /// Delays slept between consecutive attempts when every attempt fails.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_after(attempt))
    }
}

impl Display for RetryPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ max_attempts: {}, initial_delay: {:?}, backoff_multiplier: {}, max_delay: {:?} }}",
            self.max_attempts, self.initial_delay, self.backoff_multiplier, self.max_delay
        )
    }
}
