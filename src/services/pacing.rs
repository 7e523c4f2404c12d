// src/services/pacing.rs

//! Randomized request pacing.

use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::PacingConfig;

/// Spaces the starts of consecutive requests by a random interval in
/// `[min, max]`.
///
/// The first `wait` returns immediately; every later call sleeps until the
/// drawn interval has elapsed since the previous call returned. Time spent
/// on the request itself counts toward the interval, so a request slower
/// than the drawn interval is followed by no pause at all. Safe to share
/// between tasks, which then draw from one common schedule.
#[derive(Debug)]
pub struct Pacer {
    min: Duration,
    max: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
            last: Mutex::new(None),
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Draw the next interval.
    pub fn next_interval(&self) -> Duration {
        if self.max.is_zero() || self.min == self.max {
            return self.max;
        }
        let millis = rand::thread_rng()
            .gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    /// Wait for this caller's turn.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let deadline = previous + self.next_interval();
            if deadline > Instant::now() {
                tokio::time::sleep_until(deadline).await;
            }
        }
        *last = Some(Instant::now());
    }
}
