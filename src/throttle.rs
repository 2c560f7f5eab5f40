use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Floor between consecutive single-message deletions; keeps one request
/// under the per-channel deletion rate limit.
pub const DELETE_INTERVAL: Duration = Duration::from_millis(250);

/// Minimum-interval limiter placed in front of paced remote calls. One
/// instance is shared across every channel of a request so the spacing
/// holds account-wide, not per channel.
pub struct DeletePacer {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl DeletePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Waits until at least `interval` has passed since the previous slot,
    /// then claims the next slot.
    pub async fn acquire(&self) {
        let slot = self.claim(Instant::now());
        tokio::time::sleep_until(slot).await;
    }

    fn claim(&self, now: Instant) -> Instant {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = next_slot(*last, now, self.interval);
        *last = Some(slot);
        slot
    }
}

impl Default for DeletePacer {
    fn default() -> Self {
        Self::new(DELETE_INTERVAL)
    }
}

fn next_slot(last: Option<Instant>, now: Instant, interval: Duration) -> Instant {
    match last {
        Some(prev) if prev + interval > now => prev + interval,
        _ => now,
    }
}
