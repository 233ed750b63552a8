//! Politeness delay between successive fetches
//!
//! One crawl run issues its fetches strictly one after another. The cooldown
//! is slept before every fetch except the first of the run; the fetch count
//! lives in the run state so batched steps pick up where the last one left.

use std::time::Duration;

/// Fixed delay applied between the fetches of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    delay: Duration,
}

impl Cooldown {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay owed before the next fetch
    ///
    /// # Arguments
    ///
    /// * `fetches_so_far` - Fetches already issued in this run
    ///
    /// # Returns
    ///
    /// * `None` - Fetch immediately (first fetch, or no delay configured)
    /// * `Some(Duration)` - Sleep this long first
    pub fn delay_before(&self, fetches_so_far: u64) -> Option<Duration> {
        if fetches_so_far == 0 || self.delay.is_zero() {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Sleeps for the delay owed before the next fetch
    pub async fn wait(&self, fetches_so_far: u64) {
        if let Some(delay) = self.delay_before(fetches_so_far) {
            tracing::trace!("cooling down for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
